//! Account endpoints: register, login and the caller's profile.

use api_types::{
    MessageResponse,
    auth::{AuthResponse, LoginRequest, ProfilePictureUpdate, RegisterRequest, UserView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use engine::User;

use crate::{ServerError, server::ServerState};

fn auth_response(state: &ServerState, user: User) -> Result<AuthResponse, ServerError> {
    let token = state.tokens.issue(user.id)?;
    Ok(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        token,
    })
}

fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
        profile_picture: user.profile_picture,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ServerError>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let user = state
        .engine
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    tracing::info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ServerError>,
) -> Result<Json<AuthResponse>, ServerError> {
    let user = state.engine.login(&payload.email, &payload.password).await?;

    Ok(Json(auth_response(&state, user)?))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(user_view(user))
}

pub async fn delete_account(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_user(user.id).await?;
    tracing::info!(user_id = user.id, "account deleted");

    Ok(Json(MessageResponse::new("Account successfully deleted")))
}

/// Stores the path of an already uploaded picture.
pub async fn profile_picture(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ProfilePictureUpdate>, ServerError>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .set_profile_picture(user.id, payload.profile_picture.as_deref())
        .await?;

    Ok(Json(user_view(user)))
}
