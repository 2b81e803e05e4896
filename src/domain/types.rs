//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (valid identifiers, safe
//! collection names, coordinates within range) so that once a value reaches
//! the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Collection name contains characters outside `[A-Za-z0-9_-]` or is too long.
    #[error("invalid collection name")]
    InvalidCollection,
    /// Provided uuid failed format validation.
    #[error("invalid document id")]
    InvalidDocumentId,
    /// Document versions start at one.
    #[error("version must be greater than zero")]
    NonPositiveVersion,
    /// Latitude or longitude outside the valid range.
    #[error("coordinates out of range")]
    InvalidCoordinates,
}

/// Maximum length of a collection path segment.
pub const MAX_COLLECTION_NAME_LEN: usize = 64;

/// Checks that a collection name is safe to use as a storage key.
pub fn validate_collection_name(name: &str) -> Result<(), TypeConstraintError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_COLLECTION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TypeConstraintError::InvalidCollection)
    }
}

/// Store-assigned document identifier (UUID v4, exposed as `_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            Uuid::parse_str(s.trim()).map_err(|_| TypeConstraintError::InvalidDocumentId)?,
        ))
    }
}

impl TryFrom<&str> for DocumentId {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Monotonic document revision used for optimistic concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(i64);

impl Version {
    /// Version assigned to freshly created documents.
    pub const INITIAL: Version = Version(1);

    /// Creates a version ensuring it is greater than zero.
    pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NonPositiveVersion)
        }
    }

    /// Returns the raw `i64` backing this version.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// The version an update produces.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Version {
    type Error = TypeConstraintError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(
    DocumentTitle,
    "Document title wrapper enforcing trimmed, non-empty values."
);

non_empty_string_newtype!(
    PageId,
    "Discriminator of a page mock inside the shared `pageMocks` collection."
);

/// WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validates latitude in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TypeConstraintError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(TypeConstraintError::InvalidCoordinates)
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_restricted_to_safe_characters() {
        assert!(validate_collection_name("actualites").is_ok());
        assert!(validate_collection_name("pageMocks").is_ok());
        assert!(validate_collection_name("unknown-collection").is_ok());
        assert_eq!(
            validate_collection_name(""),
            Err(TypeConstraintError::InvalidCollection)
        );
        assert!(validate_collection_name("../etc").is_err());
        assert!(validate_collection_name("a b").is_err());
        assert!(validate_collection_name(&"x".repeat(MAX_COLLECTION_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn document_id_roundtrips_through_display() {
        let id = DocumentId::new();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(
            "not-a-uuid".parse::<DocumentId>(),
            Err(TypeConstraintError::InvalidDocumentId)
        );
    }

    #[test]
    fn version_rejects_non_positive_values() {
        assert_eq!(Version::new(0), Err(TypeConstraintError::NonPositiveVersion));
        assert_eq!(Version::INITIAL.next().get(), 2);
    }

    #[test]
    fn document_title_is_trimmed() {
        let title = DocumentTitle::new("  Décret  ").unwrap();
        assert_eq!(title.as_str(), "Décret");
        assert_eq!(
            DocumentTitle::new("   "),
            Err(TypeConstraintError::EmptyString)
        );
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert!(Coordinates::new(14.69, -17.44).is_ok());
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(TypeConstraintError::InvalidCoordinates)
        );
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }
}
