//! Business services behind the HTTP routes and the seed tool.

use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::collection::Collection;
use crate::domain::records::DecodeError;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod admin;
pub mod pharmacies;
pub mod public;
pub mod seed;

/// Outcome of a service call that did not succeed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("insufficient role for this collection")]
    Forbidden,

    #[error("document not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            err @ RepositoryError::Conflict { .. } => ServiceError::Conflict(err.to_string()),
            RepositoryError::ValidationError(message) => ServiceError::Form(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<DecodeError> for ServiceError {
    fn from(val: DecodeError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

/// Rejects users whose roles do not cover `collection`.
pub fn ensure_can_manage(user: &AuthenticatedUser, collection: &Collection) -> ServiceResult<()> {
    if user.can_manage(collection) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}
