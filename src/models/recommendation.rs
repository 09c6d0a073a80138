use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

/// Kind of link between a product and the product recommended alongside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "recommendation_type", rename_all = "kebab-case")]
pub enum RecommendationType {
    CrossSell,
    UpSell,
    Accessory,
}

impl RecommendationType {
    pub const ALL: [RecommendationType; 3] = [
        RecommendationType::CrossSell,
        RecommendationType::UpSell,
        RecommendationType::Accessory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::CrossSell => "cross-sell",
            RecommendationType::UpSell => "up-sell",
            RecommendationType::Accessory => "accessory",
        }
    }
}

impl Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| invalid_choice("recommendation_type", &Self::ALL))
    }
}

/// Publication state of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "recommendation_status", rename_all = "lowercase")]
pub enum RecommendationStatus {
    Active,
    Expired,
    Draft,
}

impl RecommendationStatus {
    pub const ALL: [RecommendationStatus; 3] = [
        RecommendationStatus::Active,
        RecommendationStatus::Expired,
        RecommendationStatus::Draft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Active => "active",
            RecommendationStatus::Expired => "expired",
            RecommendationStatus::Draft => "draft",
        }
    }
}

impl Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| invalid_choice("status", &Self::ALL))
    }
}

fn invalid_choice<T: Display>(name: &str, choices: &[T]) -> AppError {
    let choices: Vec<String> = choices.iter().map(ToString::to_string).collect();
    AppError::InvalidParameter(format!(
        "Invalid {}: must be one of [{}]",
        name,
        choices.join(", ")
    ))
}

/// A stored recommendation, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recommendation {
    pub id: i64,
    pub product_id: i64,
    pub recommended_id: i64,
    pub recommendation_type: RecommendationType,
    pub status: RecommendationStatus,
    pub like: i32,
    pub dislike: i32,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Column name of the like counter; `like` is an SQL keyword and must stay quoted
pub const LIKE_COLUMN: &str = "\"like\"";

/// Which feedback counter an increment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Like,
    Dislike,
}

impl Counter {
    /// Field name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Counter::Like => "like",
            Counter::Dislike => "dislike",
        }
    }

    /// Column holding the counter
    pub fn column(&self) -> &'static str {
        match self {
            Counter::Like => LIKE_COLUMN,
            Counter::Dislike => "dislike",
        }
    }
}

/// Validated field values for a record the store has not yet assigned an id to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecommendation {
    pub product_id: i64,
    pub recommended_id: i64,
    pub recommendation_type: RecommendationType,
    pub status: RecommendationStatus,
    pub like: i32,
    pub dislike: i32,
}

/// Request body for create and update.
///
/// Store-owned fields (`id`, `created_at`, `last_updated`) are accepted but
/// ignored, so a client can send back a record it previously received.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationPayload {
    pub product_id: i64,
    pub recommended_id: i64,
    pub recommendation_type: RecommendationType,
    pub status: RecommendationStatus,
    #[serde(default)]
    pub like: Option<i32>,
    #[serde(default)]
    pub dislike: Option<i32>,
}

impl RecommendationPayload {
    fn validate(&self) -> AppResult<()> {
        for (name, value) in [("like", self.like), ("dislike", self.dislike)] {
            if matches!(value, Some(count) if count < 0) {
                return Err(AppError::InvalidParameter(format!(
                    "Invalid {}: must be a non-negative integer",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Builds the insert values, defaulting absent counters to zero
    pub fn into_new(self) -> AppResult<NewRecommendation> {
        self.validate()?;
        Ok(NewRecommendation {
            product_id: self.product_id,
            recommended_id: self.recommended_id,
            recommendation_type: self.recommendation_type,
            status: self.status,
            like: self.like.unwrap_or(0),
            dislike: self.dislike.unwrap_or(0),
        })
    }

    /// Replaces the mutable fields of `record`. Counters absent from the
    /// payload keep their stored value.
    pub fn apply_to(self, record: &mut Recommendation) -> AppResult<()> {
        self.validate()?;
        record.product_id = self.product_id;
        record.recommended_id = self.recommended_id;
        record.recommendation_type = self.recommendation_type;
        record.status = self.status;
        if let Some(like) = self.like {
            record.like = like;
        }
        if let Some(dislike) = self.dislike {
            record.dislike = dislike;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Recommendation {
        let now = Utc::now();
        Recommendation {
            id: 7,
            product_id: 1,
            recommended_id: 2,
            recommendation_type: RecommendationType::UpSell,
            status: RecommendationStatus::Draft,
            like: 3,
            dislike: 1,
            created_at: now,
            last_updated: now,
        }
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&RecommendationType::CrossSell).unwrap(),
            "\"cross-sell\""
        );
        assert_eq!(
            serde_json::to_string(&RecommendationType::UpSell).unwrap(),
            "\"up-sell\""
        );
        assert_eq!(
            serde_json::to_string(&RecommendationStatus::Expired).unwrap(),
            "\"expired\""
        );
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!(
            "accessory".parse::<RecommendationType>().unwrap(),
            RecommendationType::Accessory
        );
        assert_eq!(
            "active".parse::<RecommendationStatus>().unwrap(),
            RecommendationStatus::Active
        );
        assert!("Cross-Sell".parse::<RecommendationType>().is_err());
        assert!("bogus".parse::<RecommendationStatus>().is_err());
    }

    #[test]
    fn test_invalid_choice_lists_options() {
        let err = "bogus".parse::<RecommendationType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid recommendation_type: must be one of [cross-sell, up-sell, accessory]"
        );
    }

    #[test]
    fn test_record_json_shape() {
        let value = serde_json::to_value(sample_record()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "id",
            "product_id",
            "recommended_id",
            "recommendation_type",
            "status",
            "like",
            "dislike",
            "created_at",
            "last_updated",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert_eq!(value["recommendation_type"], "up-sell");
        assert_eq!(value["status"], "draft");
    }

    #[test]
    fn test_payload_defaults_counters_to_zero() {
        let payload: RecommendationPayload = serde_json::from_value(json!({
            "product_id": 10,
            "recommended_id": 20,
            "recommendation_type": "cross-sell",
            "status": "active"
        }))
        .unwrap();
        let new = payload.into_new().unwrap();
        assert_eq!(new.like, 0);
        assert_eq!(new.dislike, 0);
    }

    #[test]
    fn test_payload_rejects_unknown_enum_value() {
        let result = serde_json::from_value::<RecommendationPayload>(json!({
            "product_id": 10,
            "recommended_id": 20,
            "recommendation_type": "bogus",
            "status": "active"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_rejects_negative_counter() {
        let payload: RecommendationPayload = serde_json::from_value(json!({
            "product_id": 10,
            "recommended_id": 20,
            "recommendation_type": "accessory",
            "status": "active",
            "dislike": -1
        }))
        .unwrap();
        assert!(matches!(
            payload.into_new(),
            Err(AppError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_apply_keeps_identity_and_absent_counters() {
        let mut record = sample_record();
        let payload: RecommendationPayload = serde_json::from_value(json!({
            "id": 999,
            "product_id": 5,
            "recommended_id": 6,
            "recommendation_type": "accessory",
            "status": "expired",
            "dislike": 4
        }))
        .unwrap();

        payload.apply_to(&mut record).unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.product_id, 5);
        assert_eq!(record.recommended_id, 6);
        assert_eq!(record.recommendation_type, RecommendationType::Accessory);
        assert_eq!(record.status, RecommendationStatus::Expired);
        assert_eq!(record.like, 3);
        assert_eq!(record.dislike, 4);
    }
}
