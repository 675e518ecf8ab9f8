use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use feed::FeedRelay;
pub use server::{ServerConfig, ServerState, router, run, run_with_listener, spawn_with_listener};
pub use token::TokenKeys;

mod auth;
mod budgets;
mod feed;
mod friends;
mod leaderboard;
mod posts;
mod server;
mod token;
mod transactions;

pub mod types {
    pub use api_types::MessageResponse;

    pub mod auth {
        pub use api_types::auth::{
            AuthResponse, LoginRequest, ProfilePictureUpdate, RegisterRequest, UserView,
        };
    }

    pub mod friends {
        pub use api_types::friends::{
            FriendRemove, FriendRequestAnswer, FriendRequestNew, FriendView, PendingRequestView,
            UserSearchResult,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{TransactionNew, TransactionUpdate, TransactionView};
    }

    pub mod budget {
        pub use api_types::budget::{BudgetPeriod, BudgetSummaryRow, BudgetUpsert, BudgetView};
    }

    pub mod leaderboard {
        pub use api_types::leaderboard::LeaderboardEntry;
    }

    pub mod post {
        pub use api_types::post::{PostNew, PostUpdate, PostView};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Missing or rejected bearer token.
    Unauthorized(&'static str),
    /// Failures that are not the client's fault; logged, never shown.
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) | EngineError::PasswordHash(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidInput(_)
        | EngineError::InvalidCredentials
        | EngineError::ExistingKey(_)
        | EngineError::RelationshipNotFound(_) => StatusCode::BAD_REQUEST,
    }
}

/// Client-facing message. Database and hashing failures become a fixed
/// "internal server error" text; their detail only goes to the log.
fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(reason) => {
            tracing::error!("password hashing error: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.to_string()),
            ServerError::Internal(reason) => {
                tracing::error!("{reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

// Malformed requests are answered like any other invalid input: 400 with a
// JSON `error` body.
impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Engine(EngineError::InvalidInput(value.body_text()))
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Engine(EngineError::InvalidInput(value.body_text()))
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Engine(EngineError::InvalidInput(value.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_400() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        for err in [
            EngineError::InvalidInput("x".to_string()),
            EngineError::InvalidCredentials,
            EngineError::RelationshipNotFound("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::Unauthorized("Not authorized, no token").into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn database_errors_hide_their_detail() {
        use http_body_util::BodyExt;

        let err = EngineError::Database(sea_orm::DbErr::Custom("no such table: users".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }

    #[test]
    fn internal_maps_to_500() {
        let res = ServerError::Internal("boom".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let res = ServerError::from(EngineError::PasswordHash("boom".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
