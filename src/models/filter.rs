use serde::Deserialize;
use std::cmp::Ordering;

use crate::error::{AppError, AppResult};

use super::{Recommendation, RecommendationStatus, RecommendationType, LIKE_COLUMN};

/// Raw list query parameters, exactly as they arrived on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub product_id: Option<String>,
    pub recommended_id: Option<String>,
    pub recommendation_type: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Validated constraints for a list query.
///
/// Absent fields impose no constraint. `sort_by` and `order` are carried
/// through untouched; the store decides what they mean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub product_id: Option<i64>,
    pub recommended_id: Option<i64>,
    pub recommendation_type: Option<RecommendationType>,
    pub status: Option<RecommendationStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl TryFrom<ListParams> for RecommendationFilter {
    type Error = AppError;

    fn try_from(params: ListParams) -> AppResult<Self> {
        Ok(Self {
            product_id: parse_int("product_id", params.product_id)?,
            recommended_id: parse_int("recommended_id", params.recommended_id)?,
            page: parse_int("page", params.page)?,
            limit: parse_int("limit", params.limit)?,
            recommendation_type: params
                .recommendation_type
                .map(|value| value.parse())
                .transpose()?,
            status: params.status.map(|value| value.parse()).transpose()?,
            sort_by: params.sort_by,
            order: params.order,
        })
    }
}

fn parse_int(name: &str, value: Option<String>) -> AppResult<Option<i64>> {
    value
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                AppError::InvalidParameter(format!("Invalid {}: must be an integer", name))
            })
        })
        .transpose()
}

/// Record fields a list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    ProductId,
    RecommendedId,
    RecommendationType,
    Status,
    Like,
    Dislike,
    CreatedAt,
    LastUpdated,
}

impl SortField {
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "id" => SortField::Id,
            "product_id" => SortField::ProductId,
            "recommended_id" => SortField::RecommendedId,
            "recommendation_type" => SortField::RecommendationType,
            "status" => SortField::Status,
            "like" => SortField::Like,
            "dislike" => SortField::Dislike,
            "created_at" => SortField::CreatedAt,
            "last_updated" => SortField::LastUpdated,
            _ => return None,
        };
        Some(field)
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::ProductId => "product_id",
            SortField::RecommendedId => "recommended_id",
            SortField::RecommendationType => "recommendation_type",
            SortField::Status => "status",
            SortField::Like => LIKE_COLUMN,
            SortField::Dislike => "dislike",
            SortField::CreatedAt => "created_at",
            SortField::LastUpdated => "last_updated",
        }
    }

    /// Orders two records by this field. Enums compare by declaration order,
    /// which is also how PostgreSQL sorts enum columns.
    pub fn compare(&self, a: &Recommendation, b: &Recommendation) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::ProductId => a.product_id.cmp(&b.product_id),
            SortField::RecommendedId => a.recommended_id.cmp(&b.recommended_id),
            SortField::RecommendationType => (a.recommendation_type as u8)
                .cmp(&(b.recommendation_type as u8)),
            SortField::Status => (a.status as u8).cmp(&(b.status as u8)),
            SortField::Like => a.like.cmp(&b.like),
            SortField::Dislike => a.dislike.cmp(&b.dislike),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::LastUpdated => a.last_updated.cmp(&b.last_updated),
        }
    }
}

impl RecommendationFilter {
    /// True when `record` satisfies every equality constraint
    pub fn matches(&self, record: &Recommendation) -> bool {
        self.product_id.map_or(true, |id| record.product_id == id)
            && self
                .recommended_id
                .map_or(true, |id| record.recommended_id == id)
            && self
                .recommendation_type
                .map_or(true, |kind| record.recommendation_type == kind)
            && self.status.map_or(true, |status| record.status == status)
    }

    /// Resolved sort field. Unknown names resolve to `None`.
    pub fn sort_field(&self) -> Option<SortField> {
        self.sort_by.as_deref().and_then(SortField::from_name)
    }

    pub fn is_descending(&self) -> bool {
        self.order
            .as_deref()
            .is_some_and(|order| order.eq_ignore_ascii_case("desc"))
    }

    /// `(offset, limit)` when a limit was requested
    pub fn window(&self) -> Option<(i64, i64)> {
        self.limit.map(|limit| {
            let limit = limit.max(0);
            let page = self.page.unwrap_or(1).max(1);
            (page.saturating_sub(1).saturating_mul(limit), limit)
        })
    }
}
