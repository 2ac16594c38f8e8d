use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{
    dto::project_dto::{
        ProjectDetailResponse, ProjectFilter, ProjectListQuery, ProjectListResponse,
        ProjectPayload,
    },
    error::Result,
    middleware::auth::AuthUser,
    models::project::ProjectStatus,
    routes::extract::ApiJson,
    utils::validation::parse_id,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/projects",
    responses(
        (status = 201, description = "Project created"),
        (status = 400, description = "Invalid payload or duplicate title"),
        (status = 403, description = "Only clients create projects")
    )
)]
#[axum::debug_handler]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ProjectPayload>,
) -> Result<impl IntoResponse> {
    let project = state.project_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    params(
        ("status" = Option<String>, Query, description = "open, in-progress, completed or cancelled"),
        ("skills" = Option<String>, Query, description = "Comma-separated skills, all required"),
        ("minBudget" = Option<String>, Query, description = "Lowest budget"),
        ("maxBudget" = Option<String>, Query, description = "Highest budget"),
        ("beforeDeadline" = Option<String>, Query, description = "Deadline on or before this date"),
        ("afterDeadline" = Option<String>, Query, description = "Deadline on or after this date"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Projects visible to the caller"),
        (status = 400, description = "Invalid filter value"),
        (status = 403, description = "Students can only view open projects")
    )
)]
#[axum::debug_handler]
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<ProjectListQuery>,
) -> Result<impl IntoResponse> {
    let filter = ProjectFilter::try_from(query)?;
    let list = state.project_service.list(&actor, &filter).await?;
    Ok(Json(ProjectListResponse::from(list)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project, with reviews once completed"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn get_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "project")?;
    let project = state.project_service.get(&actor, id).await?;
    let reviews = if project.status == ProjectStatus::Completed {
        Some(state.review_service.list_for_project(id).await?)
    } else {
        None
    };
    Ok(Json(ProjectDetailResponse { project, reviews }))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project updated"),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn update_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ProjectPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "project")?;
    let project = state.project_service.update(&actor, id, payload).await?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project and its applications and reviews deleted"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "project")?;
    state.project_service.delete(&actor, id).await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
