//! Read-only services backing the public pages.

use crate::domain::collection::Collection;
use crate::domain::document::ResourceDocument;
use crate::domain::types::DocumentId;
use crate::repository::{DocumentListQuery, DocumentReader};
use crate::services::{ServiceError, ServiceResult};

/// Lists every document of a collection in insertion order.
pub fn list_documents<R>(repo: &R, collection: &str) -> ServiceResult<Vec<ResourceDocument>>
where
    R: DocumentReader + ?Sized,
{
    let collection = Collection::parse(collection)?;

    let (_total, documents) = repo.list_documents(DocumentListQuery::new(collection))?;

    Ok(documents.into_iter().map(|d| d.into_resource()).collect())
}

/// Loads a single document by identifier.
pub fn get_document<R>(repo: &R, collection: &str, id: &str) -> ServiceResult<ResourceDocument>
where
    R: DocumentReader + ?Sized,
{
    let collection = Collection::parse(collection)?;
    // Malformed identifiers cannot match any stored document.
    let id = DocumentId::try_from(id).map_err(|_| ServiceError::NotFound)?;

    let document = repo
        .get_document(&collection, id)?
        .ok_or(ServiceError::NotFound)?;

    Ok(document.into_resource())
}
