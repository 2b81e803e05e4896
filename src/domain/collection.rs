//! Named document buckets and their cardinality conventions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, validate_collection_name};

/// A named bucket of documents in the backing store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Collection {
    Actualites,
    Articles,
    Communiques,
    Decisions,
    Decrets,
    Lois,
    Commissions,
    Theses,
    Photos,
    Videos,
    Pharmaciens,
    Pharmacies,
    Formations,
    Deontologie,
    PageMocks,
    Other(String),
}

/// How public pages treat the documents of a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    /// The page shows one current document (the first one stored).
    Singleton,
    /// The page shows every document.
    List,
}

impl Collection {
    /// Every collection with a dedicated record decoder.
    pub const KNOWN: [Collection; 15] = [
        Collection::Actualites,
        Collection::Articles,
        Collection::Communiques,
        Collection::Decisions,
        Collection::Decrets,
        Collection::Lois,
        Collection::Commissions,
        Collection::Theses,
        Collection::Photos,
        Collection::Videos,
        Collection::Pharmaciens,
        Collection::Pharmacies,
        Collection::Formations,
        Collection::Deontologie,
        Collection::PageMocks,
    ];

    /// Parses a path segment, rejecting names unsafe for storage.
    pub fn parse(name: &str) -> Result<Self, TypeConstraintError> {
        validate_collection_name(name)?;
        Ok(Self::from(name))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Collection::Actualites => "actualites",
            Collection::Articles => "articles",
            Collection::Communiques => "communiques",
            Collection::Decisions => "decisions",
            Collection::Decrets => "decrets",
            Collection::Lois => "lois",
            Collection::Commissions => "commissions",
            Collection::Theses => "theses",
            Collection::Photos => "photos",
            Collection::Videos => "videos",
            Collection::Pharmaciens => "pharmaciens",
            Collection::Pharmacies => "pharmacies",
            Collection::Formations => "formations",
            Collection::Deontologie => "deontologie",
            Collection::PageMocks => "pageMocks",
            Collection::Other(name) => name,
        }
    }

    /// `videos` is the only list collection; everything else is read as a
    /// single current document.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Collection::Videos => Cardinality::List,
            _ => Cardinality::Singleton,
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Collection {
    fn from(s: &str) -> Self {
        match s {
            "actualites" => Collection::Actualites,
            "articles" => Collection::Articles,
            "communiques" => Collection::Communiques,
            "decisions" => Collection::Decisions,
            "decrets" => Collection::Decrets,
            "lois" => Collection::Lois,
            "commissions" => Collection::Commissions,
            "theses" => Collection::Theses,
            "photos" => Collection::Photos,
            "videos" => Collection::Videos,
            "pharmaciens" => Collection::Pharmaciens,
            "pharmacies" => Collection::Pharmacies,
            "formations" => Collection::Formations,
            "deontologie" => Collection::Deontologie,
            "pageMocks" => Collection::PageMocks,
            _ => Collection::Other(s.to_string()),
        }
    }
}

impl From<String> for Collection {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<Collection> for String {
    fn from(value: Collection) -> Self {
        value.as_str().to_string()
    }
}
