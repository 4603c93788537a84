//! Registration and login endpoints

use api_types::user::{AuthResponse, Login, Register, UserView};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{Session, User};

use crate::{ServerError, server::ServerState};

fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

fn auth_response(session: Session) -> AuthResponse {
    AuthResponse {
        token: session.token,
        user: user_view(session.user),
    }
}

/// Handle requests for creating a new account
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Register>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let Json(payload) = payload?;
    let session = state
        .engine
        .register(
            payload.name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(auth_response(session))))
}

/// Handle requests for logging in with email and password
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> Result<Json<AuthResponse>, ServerError> {
    let Json(payload) = payload?;
    let session = state
        .engine
        .login(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(auth_response(session)))
}
