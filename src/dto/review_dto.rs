use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
    pub project_id: Uuid,
    pub reviewee_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be a number between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000, message = "Comment is required"))]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewPayload {
    #[validate(range(min = 1, max = 5, message = "Rating must be a number between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000, message = "Comment is required"))]
    pub comment: String,
}
