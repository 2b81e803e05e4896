//! Fixture loading for the `seed` binary.

use std::str::FromStr;

use serde_json::Value;

use crate::domain::collection::Collection;
use crate::domain::types::PageId;
use crate::forms::document::DocumentPayload;
use crate::repository::{CollectionReplacement, DocumentWriter};
use crate::services::{ServiceError, ServiceResult};

/// Fixtures keyed by collection name.
pub const COLLECTION_FIXTURES: &str = include_str!("../../fixtures/collections.json");
/// Page mocks sharing the `pageMocks` collection.
pub const PAGE_MOCK_FIXTURES: &str = include_str!("../../fixtures/page_mocks.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// One collection per resource page.
    #[default]
    Collections,
    /// A single `pageMocks` collection discriminated by `pageId`.
    PageMocks,
}

impl SeedMode {
    pub fn fixtures(self) -> &'static str {
        match self {
            SeedMode::Collections => COLLECTION_FIXTURES,
            SeedMode::PageMocks => PAGE_MOCK_FIXTURES,
        }
    }
}

impl FromStr for SeedMode {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collections" => Ok(SeedMode::Collections),
            "page-mocks" | "pageMocks" => Ok(SeedMode::PageMocks),
            other => Err(ServiceError::Form(format!(
                "unknown seed mode `{other}`, expected `collections` or `page-mocks`"
            ))),
        }
    }
}

fn parse_fixtures(raw: &str) -> ServiceResult<Value> {
    serde_json::from_str(raw).map_err(|e| ServiceError::Form(format!("malformed fixtures: {e}")))
}

fn fixture_batch(collection: Collection, records: Vec<Value>) -> ServiceResult<CollectionReplacement> {
    let mut documents = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let payload = DocumentPayload::try_from(record)
            .map_err(|e| ServiceError::Form(format!("{collection}[{index}]: {e}")))?;
        payload
            .validate_for(&collection)
            .map_err(|e| ServiceError::Form(format!("{collection}[{index}]: {e}")))?;
        documents.push(payload.into_new_document(collection.clone()));
    }
    Ok(CollectionReplacement {
        collection,
        documents,
    })
}

/// Builds one replacement batch per collection of a `{ name: [records] }` object.
pub fn collection_batches(raw: &str) -> ServiceResult<Vec<CollectionReplacement>> {
    let Value::Object(collections) = parse_fixtures(raw)? else {
        return Err(ServiceError::Form(
            "collection fixtures must be an object keyed by collection".to_string(),
        ));
    };

    collections
        .into_iter()
        .map(|(name, records)| {
            let collection = Collection::parse(&name)?;
            let Value::Array(records) = records else {
                return Err(ServiceError::Form(format!("`{name}` fixtures must be an array")));
            };
            fixture_batch(collection, records)
        })
        .collect()
}

/// Builds the single `pageMocks` batch; every record needs a `pageId`.
pub fn page_mock_batch(raw: &str) -> ServiceResult<Vec<CollectionReplacement>> {
    let Value::Array(records) = parse_fixtures(raw)? else {
        return Err(ServiceError::Form("page mock fixtures must be an array".to_string()));
    };

    for (index, record) in records.iter().enumerate() {
        let page_id = record.get("pageId").and_then(Value::as_str).unwrap_or_default();
        PageId::new(page_id)
            .map_err(|_| ServiceError::Form(format!("pageMocks[{index}]: missing pageId")))?;
    }

    Ok(vec![fixture_batch(Collection::PageMocks, records)?])
}

/// Replaces the fixture collections with the fixture records in one transaction.
pub fn seed<R>(repo: &R, mode: SeedMode, raw: &str) -> ServiceResult<usize>
where
    R: DocumentWriter + ?Sized,
{
    let batches = match mode {
        SeedMode::Collections => collection_batches(raw)?,
        SeedMode::PageMocks => page_mock_batch(raw)?,
    };

    for batch in &batches {
        log::info!(
            "Seeding {} document(s) into `{}`",
            batch.documents.len(),
            batch.collection
        );
    }

    Ok(repo.replace_collections(&batches)?)
}
