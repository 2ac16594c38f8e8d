use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{
    dto::review_dto::{CreateReviewPayload, UpdateReviewPayload},
    error::Result,
    middleware::auth::AuthUser,
    routes::extract::ApiJson,
    utils::validation::parse_id,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/reviews",
    responses(
        (status = 201, description = "Review created"),
        (status = 400, description = "Invalid rating or comment, or already reviewed"),
        (status = 403, description = "Not the project owner, or student not assigned"),
        (status = 404, description = "Project or student not found")
    )
)]
#[axum::debug_handler]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateReviewPayload>,
) -> Result<impl IntoResponse> {
    let review = state.review_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review found"),
        (status = 404, description = "Review not found")
    )
)]
#[axum::debug_handler]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "review")?;
    let review = state.review_service.get_by_id(id).await?;
    Ok(Json(review))
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review updated"),
        (status = 400, description = "Invalid rating or comment"),
        (status = 403, description = "Only the author may edit"),
        (status = 404, description = "Review not found")
    )
)]
#[axum::debug_handler]
pub async fn update_review(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateReviewPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "review")?;
    let review = state.review_service.update(&actor, id, payload).await?;
    Ok(Json(review))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Only the author may delete"),
        (status = 404, description = "Review not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "review")?;
    state.review_service.delete(&actor, id).await?;
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}
