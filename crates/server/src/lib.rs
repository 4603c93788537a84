use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use api_types::ErrorResponse;
pub use server::{AuthUser, RouterConfig, ServerState, router, run_with_listener};

mod auth;
mod expenses;
mod health;
mod server;

pub mod types {
    pub mod user {
        pub use api_types::user::{AuthResponse, Login, Register, UserView};
    }

    pub mod expense {
        pub use api_types::expense::{
            CategoryTotal, ExpenseListQuery, ExpenseNew, ExpenseSummary, ExpenseSummaryQuery,
            ExpenseView,
        };
    }

    pub mod health {
        pub use api_types::health::Health;
    }
}

const INTERNAL_ERROR: &str = "Internal Server Error";

pub enum ServerError {
    Engine(EngineError),
    /// Malformed request that never reached the engine.
    Generic(String),
    Unauthorized(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::Conflict(_) => StatusCode::BAD_REQUEST,
        EngineError::Auth(_) => StatusCode::UNAUTHORIZED,
        EngineError::DuplicateKey(_) => StatusCode::CONFLICT,
        EngineError::Internal(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::DuplicateKey(detail) => {
            tracing::warn!("unique index violation: {detail}");
            "Duplicate entry detected".to_string()
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            INTERNAL_ERROR.to_string()
        }
        EngineError::Internal(detail) => {
            tracing::error!("internal error: {detail}");
            INTERNAL_ERROR.to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        tracing::debug!("rejected body: {value}");
        Self::Generic("Malformed JSON body".to_string())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body(res: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_conflict_maps_to_400() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_auth_maps_to_401() {
        let res = ServerError::from(EngineError::Auth("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_key_maps_to_409_without_details() {
        let res = ServerError::from(EngineError::DuplicateKey(
            "UNIQUE constraint failed: users.email".to_string(),
        ))
        .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(body(res).await, r#"{"error":"Duplicate entry detected"}"#);
    }

    #[tokio::test]
    async fn storage_errors_are_hidden() {
        let res = ServerError::from(EngineError::Database(sea_orm_err())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(res).await, r#"{"error":"Internal Server Error"}"#);

        let res = ServerError::from(EngineError::Internal("bcrypt".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(res).await, r#"{"error":"Internal Server Error"}"#);
    }

    fn sea_orm_err() -> sea_orm::DbErr {
        sea_orm::DbErr::Custom("disk I/O error".to_string())
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
