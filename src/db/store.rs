use crate::{
    error::AppResult,
    models::{Counter, NewRecommendation, Recommendation, RecommendationFilter},
};

/// Persistence for recommendation records
///
/// Implementations assign ids and maintain `created_at` / `last_updated`.
/// Lookups by id return `Ok(None)` for a missing record; turning that into a
/// client-facing error is left to the service layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Fetch a single record by id
    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>>;

    /// Fetch every record matching the filter, ordered and windowed as it asks
    async fn find_by_filter(&self, filter: &RecommendationFilter)
        -> AppResult<Vec<Recommendation>>;

    /// Insert a new record and return it with its assigned id and timestamps
    async fn create(&self, values: NewRecommendation) -> AppResult<Recommendation>;

    /// Overwrite the mutable fields of an existing record
    ///
    /// Returns `None` if the record disappeared before the write.
    async fn update(&self, record: &Recommendation) -> AppResult<Option<Recommendation>>;

    /// Remove a record. Returns whether anything was deleted.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Add one to a feedback counter as a single atomic store operation
    async fn increment(&self, id: i64, counter: Counter) -> AppResult<Option<Recommendation>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
