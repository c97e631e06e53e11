//! The module contains the errors the engine can throw.
//!
//! Domain errors are returned synchronously and never retried by the engine:
//!
//! - [`KeyNotFound`] thrown when a request, item or account does not exist.
//! - [`Forbidden`] thrown when the actor's role or ownership does not allow the change.
//! - [`InvalidTransition`] thrown when a status change is not permitted from the current state.
//! - [`Conflict`] thrown when a concurrent writer saved the same donation request first.
//!
//! Storage failures are wrapped in [`Database`] and kept distinct from the domain errors.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
