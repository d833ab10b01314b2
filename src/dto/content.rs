use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct PromotionMetadata {
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    /// Id of an uploaded file.
    pub image: Option<Uuid>,
}

fn validate_window(metadata: &PromotionMetadata) -> Result<(), ValidationError> {
    if metadata.valid_from > metadata.valid_to {
        return Err(ValidationError::new("valid_from_after_valid_to"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PromotionRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(nested)]
    pub metadata: PromotionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_window_must_not_be_inverted() {
        let request = PromotionRequest {
            title: "Spring sale".into(),
            content: "Everything for cats".into(),
            metadata: PromotionMetadata {
                valid_from: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                valid_to: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                image: None,
            },
        };
        assert!(request.validate().is_err());
    }
}
