use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{
    dto::application_dto::{
        ProjectApplicationsResponse, StudentApplicationsQuery, UpdateApplicationStatusPayload,
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    routes::extract::{ApiJson, FormParts},
    utils::validation::parse_id,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    responses(
        (status = 201, description = "Application submitted"),
        (status = 400, description = "Duplicate application, closed project or invalid resume"),
        (status = 403, description = "Only students apply"),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = FormParts::read(multipart, &["resume"]).await?;
    let project_id = form
        .text("projectId")
        .ok_or_else(|| Error::BadRequest("Project id is required".into()))
        .and_then(|raw| parse_id(raw, "project"))?;
    let resume = form.take_file("resume");

    let application = state
        .application_service
        .create(&actor, project_id, resume)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications/student",
    params(
        ("studentId" = Option<String>, Query, description = "Student to list, admin only")
    ),
    responses(
        (status = 200, description = "Applications of the student, newest first"),
        (status = 403, description = "Not authorized")
    )
)]
#[axum::debug_handler]
pub async fn list_student_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<StudentApplicationsQuery>,
) -> Result<impl IntoResponse> {
    let student_id = query
        .student_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| parse_id(raw, "student"))
        .transpose()?;
    let applications = state
        .application_service
        .list_for_student(&actor, student_id)
        .await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/project/{projectId}",
    params(
        ("projectId" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project with its applications, newest first"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Project not found")
    )
)]
#[axum::debug_handler]
pub async fn list_project_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse> {
    let project_id = parse_id(&project_id, "project")?;
    let (project, applications) = state
        .application_service
        .list_for_project(&actor, project_id)
        .await?;
    Ok(Json(ProjectApplicationsResponse {
        project,
        applications,
    }))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "application")?;
    let application = state.application_service.get(&actor, id).await?;
    Ok(Json(application))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Invalid status or transition"),
        (status = 403, description = "Only the project owner decides"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "application")?;
    let application = state
        .application_service
        .update_status(&actor, id, &payload.status)
        .await?;
    Ok(Json(application))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application withdrawn"),
        (status = 403, description = "Only the applicant may delete"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_application(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "application")?;
    state.application_service.delete(&actor, id).await?;
    Ok(Json(json!({ "message": "Application deleted successfully" })))
}
