pub mod filter;
pub mod recommendation;

pub use filter::{ListParams, RecommendationFilter, SortField};
pub use recommendation::{
    Counter, NewRecommendation, Recommendation, RecommendationPayload, RecommendationStatus,
    RecommendationType, LIKE_COLUMN,
};
