//! The module contains the errors the engine can throw.
//!
//! The taxonomy follows the HTTP mapping done by the server crate:
//!
//! - [`Validation`] malformed or missing input.
//! - [`BusinessRule`] a domain rule rejected the operation.
//! - [`NotFound`] a referenced entity does not exist.
//! - [`Unauthorized`] the principal lacks the required role.
//! - [`Database`] an unexpected store failure.
//!
//! [`Validation`]: EngineError::Validation
//! [`BusinessRule`]: EngineError::BusinessRule
//! [`NotFound`]: EngineError::NotFound
//! [`Unauthorized`]: EngineError::Unauthorized
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{0}")]
    BusinessRule(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::BusinessRule(a), Self::BusinessRule(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
