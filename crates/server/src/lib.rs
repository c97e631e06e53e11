use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod admin;
mod donations;
mod follows;
mod posts;
mod server;
mod transactions;
mod wallets;

pub mod types {
    pub mod donation {
        pub use api_types::donation::{
            DonationItemView, DonationListQuery, DonationRequestEdit, DonationRequestNew,
            DonationRequestView, ItemNew, ItemStatus, ItemStatusChange, ItemsReplace,
            RequestStatus, UpdatedBy,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            PaymentNew, TransactionKind, TransactionStatus, TransactionView, WithdrawNew,
        };
    }

    pub mod wallet {
        pub use api_types::wallet::{ActivationStatus, BankDetails, WalletActivationNew, WalletView};
    }

    pub mod account {
        pub use api_types::account::{AccountKind, AccountView, InstituteType};
    }

    pub mod post {
        pub use api_types::post::{
            Author, AuthorRole, CommentNew, CommentView, LikeView, PostEdit, PostKind,
            PostListQuery, PostNew, PostStatus, PostStatusChange, PostView, ReplyView, ShareNew,
            SharePlatform, ShareView,
        };
    }

    pub mod admin {
        pub use api_types::admin::{
            ActivationDecision, ActivationListQuery, ActivationRequestView, ActivationReview,
            WithdrawDecision, WithdrawListQuery, WithdrawRequestView, WithdrawReview,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::Validation(_)
        | EngineError::InsufficientFunds(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Malformed or mistyped bodies are client errors with a JSON message,
/// like every other error this server returns.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Generic(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    fn status_of(err: EngineError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        assert_eq!(status_of(EngineError::KeyNotFound("x".to_string())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_unauthorized_maps_to_401() {
        assert_eq!(
            status_of(EngineError::Unauthorized("admin".to_string())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn engine_forbidden_maps_to_403() {
        assert_eq!(
            status_of(EngineError::Forbidden("forbidden".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn engine_invalid_transition_maps_to_400() {
        assert_eq!(
            status_of(EngineError::InvalidTransition("taken".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn engine_duplicates_and_stale_versions_map_to_409() {
        assert_eq!(status_of(EngineError::ExistingKey("x".to_string())), StatusCode::CONFLICT);
        assert_eq!(status_of(EngineError::Conflict("x".to_string())), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::Validation("x".to_string()),
            EngineError::InsufficientFunds("x".to_string()),
            EngineError::InvalidId("x".to_string()),
        ] {
            assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_errors_map_to_500() {
        let err = EngineError::Database(DbErr::Custom("disk on fire".to_string()));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn database_errors_hide_details() {
        let err = EngineError::Database(DbErr::Custom("disk on fire".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
