pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::{create_pool, run_migrations, PgRecommendationStore};
pub use store::RecommendationStore;

#[cfg(test)]
pub use store::MockRecommendationStore;
