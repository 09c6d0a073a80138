use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Counter, NewRecommendation, Recommendation, RecommendationFilter, SortField},
};

use super::RecommendationStore;

/// Process-local store with the same semantics as the PostgreSQL one
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<InMemoryInner>,
}

#[derive(Default)]
struct InMemoryInner {
    last_id: i64,
    records: BTreeMap<i64, Recommendation>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryStore {
    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn find_by_filter(
        &self,
        filter: &RecommendationFilter,
    ) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        let mut records: Vec<Recommendation> = inner
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();

        match filter.sort_field() {
            Some(field) => {
                let descending = filter.is_descending();
                records.sort_by(|a, b| {
                    let ordering = field.compare(a, b);
                    let ordering = if descending { ordering.reverse() } else { ordering };
                    ordering.then_with(|| SortField::Id.compare(a, b))
                });
            }
            None => {
                if let Some(sort_by) = &filter.sort_by {
                    tracing::warn!(sort_by = %sort_by, "Ignoring unknown sort field");
                }
            }
        }

        if let Some((offset, limit)) = filter.window() {
            records = records
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(0))
                .collect();
        }

        Ok(records)
    }

    async fn create(&self, values: NewRecommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let now = Utc::now();
        let record = Recommendation {
            id: inner.last_id,
            product_id: values.product_id,
            recommended_id: values.recommended_id,
            recommendation_type: values.recommendation_type,
            status: values.status,
            like: values.like,
            dislike: values.dislike,
            created_at: now,
            last_updated: now,
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &Recommendation) -> AppResult<Option<Recommendation>> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.records.get_mut(&record.id) else {
            return Ok(None);
        };

        stored.product_id = record.product_id;
        stored.recommended_id = record.recommended_id;
        stored.recommendation_type = record.recommendation_type;
        stored.status = record.status;
        stored.like = record.like;
        stored.dislike = record.dislike;
        stored.last_updated = Utc::now();

        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.inner.write().await.records.remove(&id).is_some())
    }

    async fn increment(&self, id: i64, counter: Counter) -> AppResult<Option<Recommendation>> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.records.get_mut(&id) else {
            return Ok(None);
        };

        let value = match counter {
            Counter::Like => &mut stored.like,
            Counter::Dislike => &mut stored.dislike,
        };
        *value = value.checked_add(1).ok_or_else(|| {
            AppError::Internal(format!(
                "{} counter of recommendation {} is out of range",
                counter.name(),
                id
            ))
        })?;
        stored.last_updated = Utc::now();

        Ok(Some(stored.clone()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecommendationStatus, RecommendationType};
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn new_rec(product_id: i64, status: RecommendationStatus, like: i32) -> NewRecommendation {
        NewRecommendation {
            product_id,
            recommended_id: product_id + 100,
            recommendation_type: RecommendationType::CrossSell,
            status,
            like,
            dislike: 0,
        }
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.create(new_rec(1, RecommendationStatus::Active, 5)).await.unwrap();
        store.create(new_rec(2, RecommendationStatus::Draft, 1)).await.unwrap();
        store.create(new_rec(1, RecommendationStatus::Expired, 9)).await.unwrap();
        store.create(new_rec(3, RecommendationStatus::Active, 5)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = seeded().await;
        let ids: Vec<i64> = store
            .find_by_filter(&RecommendationFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_filter_by_status_and_product() {
        let store = seeded().await;
        let active = store
            .find_by_filter(&RecommendationFilter {
                status: Some(RecommendationStatus::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|r| r.status == RecommendationStatus::Active));

        let product_one = store
            .find_by_filter(&RecommendationFilter {
                product_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(product_one.len(), 2);
    }

    #[tokio::test]
    async fn test_sort_descending_breaks_ties_by_id() {
        let store = seeded().await;
        let sorted = store
            .find_by_filter(&RecommendationFilter {
                sort_by: Some("like".into()),
                order: Some("desc".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = sorted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let store = seeded().await;
        let page_two = store
            .find_by_filter(&RecommendationFilter {
                page: Some(2),
                limit: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].id, 4);
    }

    #[tokio::test]
    async fn test_increment_missing_record() {
        let store = InMemoryStore::new();
        let result = assert_ok!(store.increment(42, Counter::Like).await);
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_increment_at_max_fails_without_changing_record() {
        let store = InMemoryStore::new();
        let id = store
            .create(new_rec(1, RecommendationStatus::Active, i32::MAX))
            .await
            .unwrap()
            .id;

        let result = store.increment(id, Counter::Like).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let stored = store.find(id).await.unwrap().unwrap();
        assert_eq!(stored.like, i32::MAX);

        let disliked = assert_ok!(store.increment(id, Counter::Dislike).await).unwrap();
        assert_eq!(disliked.dislike, 1);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryStore::new());
        let id = store
            .create(new_rec(1, RecommendationStatus::Active, 0))
            .await
            .unwrap()
            .id;

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.increment(id, Counter::Like).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = store.find(id).await.unwrap().unwrap();
        assert_eq!(stored.like, 20);
    }
}
