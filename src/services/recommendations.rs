use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::{Counter, Recommendation, RecommendationFilter, RecommendationPayload},
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Recommendation with id '{}' was not found.", id))
}

/// Fetches a single recommendation
pub async fn get_recommendation(
    store: &dyn RecommendationStore,
    id: i64,
) -> AppResult<Recommendation> {
    store.find(id).await?.ok_or_else(|| not_found(id))
}

/// Lists recommendations matching an already validated filter
pub async fn list_recommendations(
    store: &dyn RecommendationStore,
    filter: &RecommendationFilter,
) -> AppResult<Vec<Recommendation>> {
    let records = store.find_by_filter(filter).await?;
    tracing::info!(count = records.len(), "Recommendations returned");
    Ok(records)
}

/// Creates a recommendation from a client payload
pub async fn create_recommendation(
    store: &dyn RecommendationStore,
    payload: RecommendationPayload,
) -> AppResult<Recommendation> {
    let record = store.create(payload.into_new()?).await?;
    tracing::info!(id = record.id, "Recommendation created");
    Ok(record)
}

/// Replaces the mutable fields of an existing recommendation.
///
/// The identity always comes from `id`; anything the payload says about it
/// was discarded at deserialization.
pub async fn update_recommendation(
    store: &dyn RecommendationStore,
    id: i64,
    payload: RecommendationPayload,
) -> AppResult<Recommendation> {
    let mut record = get_recommendation(store, id).await?;
    payload.apply_to(&mut record)?;
    record.id = id;

    let updated = store.update(&record).await?.ok_or_else(|| not_found(id))?;
    tracing::info!(id, "Recommendation updated");
    Ok(updated)
}

/// Deletes a recommendation if it exists. Missing ids are not an error.
pub async fn delete_recommendation(store: &dyn RecommendationStore, id: i64) -> AppResult<()> {
    if store.delete(id).await? {
        tracing::info!(id, "Recommendation deleted");
    } else {
        tracing::info!(id, "Recommendation not found, nothing to delete");
    }
    Ok(())
}

/// Adds one to the like or dislike counter
pub async fn record_feedback(
    store: &dyn RecommendationStore,
    id: i64,
    counter: Counter,
) -> AppResult<Recommendation> {
    let record = store
        .increment(id, counter)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, counter = ?counter, like = record.like, dislike = record.dislike, "Feedback recorded");
    Ok(record)
}
