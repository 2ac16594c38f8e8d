use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{
    dto::user_dto::{
        BlockResponse, LoginPayload, LoginResponse, ProfileInput, PublicUser, RegisterPayload,
        UserProfileResponse,
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::user::{Profile, Role},
    routes::extract::{ApiJson, FormParts},
    services::{storage_service::Folder, user_service::NewAccount},
    utils::{
        token::issue_token,
        upload::accept_image,
        validation::{parse_id, validate},
    },
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/users/register",
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing or invalid fields, or account already exists")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = FormParts::read(multipart, &["userImage"]).await?;

    let (Some(username), Some(email), Some(password), Some(role)) = (
        form.text("username"),
        form.text("email"),
        form.raw("password"),
        form.text("role"),
    ) else {
        return Err(Error::BadRequest("All fields are required".into()));
    };

    let role: Role = role.parse()?;
    if role == Role::Admin {
        return Err(Error::BadRequest("Invalid role provided".into()));
    }
    let payload = RegisterPayload {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
    };
    validate(&payload)?;

    let profile_field = match role {
        Role::Client => "clientProfile",
        _ => "studentProfile",
    };
    let input = ProfileInput::parse(role, form.text(profile_field))?;
    let missing_image = input.missing_image_message();
    let mut profile = input.into_profile(String::new())?;

    if state
        .user_service
        .identity_taken(&payload.username, &payload.email)
        .await?
    {
        return Err(Error::BadRequest(
            "User already exists with given email or username".into(),
        ));
    }

    let image = form
        .take_file("userImage")
        .ok_or_else(|| Error::BadRequest(missing_image.into()))
        .and_then(accept_image)?;
    let image_url = state.storage.store(Folder::Images, &image).await?;
    profile.set_image_url(image_url.clone());

    let created = state
        .user_service
        .create(NewAccount {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            profile,
        })
        .await;

    match created {
        Ok(user) => Ok((StatusCode::CREATED, Json(PublicUser::from(user)))),
        Err(e) => {
            state.storage.remove_all([&image_url]).await;
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    responses(
        (status = 200, description = "Logged in, token issued"),
        (status = 400, description = "Invalid user credentials"),
        (status = 403, description = "Account is blocked")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let user = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;
    let token = issue_token(
        user.id,
        user.role(),
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "User logged in successfully".into(),
        user: PublicUser::from(user),
        jwt_token: token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The caller's account"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(actor.id).await?;
    Ok(Json(PublicUser::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Missing or invalid profile fields")
    )
)]
#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<impl IntoResponse> {
    let current = state.user_service.get_by_id(actor.id).await?;
    let image_url = current
        .profile
        .image_url()
        .map(str::to_string)
        .unwrap_or_default();

    let raw = serde_json::to_string(&body)?;
    let profile = ProfileInput::parse(current.role(), Some(&raw))?.into_profile(image_url)?;
    let user = state.user_service.update_profile(actor.id, profile).await?;
    Ok(Json(PublicUser::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile with reviews or projects"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "user")?;
    let user = state.user_service.get_by_id(id).await?;

    let (reviews, projects) = match &user.profile {
        Profile::Student(_) => (
            Some(state.review_service.list_for_reviewee(id).await?),
            None,
        ),
        Profile::Client(_) => (None, Some(state.project_service.list_by_owner(id).await?)),
        Profile::Admin => (None, None),
    };

    Ok(Json(UserProfileResponse {
        user: PublicUser::from(user),
        reviews,
        projects,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User and dependent records deleted"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "user")?;
    state.moderation_service.delete_user(&actor, id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/block",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Block flag toggled"),
        (status = 400, description = "Admin accounts cannot be blocked"),
        (status = 403, description = "Not authorized")
    )
)]
#[axum::debug_handler]
pub async fn toggle_block(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "user")?;
    let outcome = state.moderation_service.toggle_block(&actor, id).await?;
    Ok(Json(BlockResponse {
        id: outcome.user_id,
        is_blocked: outcome.is_blocked,
        projects_cancelled: outcome.projects_cancelled,
        applications_suspended: outcome.applications_suspended,
    }))
}
