//! Request payloads accepted by the document API.

use thiserror::Error;
use validator::ValidationErrors;

pub mod document;
pub mod pharmacies;

#[derive(Debug, Error)]
/// Errors that can occur when processing request payloads.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("title must be a non-empty string")]
    InvalidTitle,

    #[error("version must be a positive integer")]
    InvalidVersion,

    #[error("pdfUrl must point to a PDF file")]
    NotPdf,

    #[error("pdfSize must be a non-negative number of bytes")]
    InvalidPdfSize,

    #[error("PDF exceeds the {max} byte limit")]
    FileTooLarge { max: u64 },

    #[error("latitude and longitude must be supplied together")]
    IncompleteCoordinates,

    #[error("invalid coordinates")]
    InvalidCoordinates,

    #[error("invalid garde flag")]
    InvalidGarde,
}
