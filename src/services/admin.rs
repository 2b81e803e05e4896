//! Role-gated document management for the admin and pharmacist back-offices.

use serde_json::Value;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::collection::Collection;
use crate::domain::document::ResourceDocument;
use crate::domain::types::DocumentId;
use crate::forms::document::DocumentPayload;
use crate::repository::{DocumentListQuery, DocumentReader, DocumentWriter};
use crate::services::{ServiceError, ServiceResult, ensure_can_manage};

fn parse_id(id: &str) -> ServiceResult<DocumentId> {
    DocumentId::try_from(id).map_err(|_| ServiceError::NotFound)
}

/// Lists the documents of a collection the user is allowed to manage.
pub fn list_documents<R>(
    repo: &R,
    user: &AuthenticatedUser,
    collection: &str,
) -> ServiceResult<Vec<ResourceDocument>>
where
    R: DocumentReader + ?Sized,
{
    let collection = Collection::parse(collection)?;
    ensure_can_manage(user, &collection)?;

    let (_total, documents) = repo.list_documents(DocumentListQuery::new(collection))?;

    Ok(documents.into_iter().map(|d| d.into_resource()).collect())
}

/// Validates the payload and stores it as a new document.
pub fn create_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    collection: &str,
    payload: Value,
) -> ServiceResult<ResourceDocument>
where
    R: DocumentWriter + ?Sized,
{
    let collection = Collection::parse(collection)?;
    ensure_can_manage(user, &collection)?;

    let payload = DocumentPayload::try_from(payload)?;
    payload.validate_for(&collection)?;

    let created = repo.create_document(&payload.into_new_document(collection))?;

    log::info!(
        "{} created document {} in `{}`",
        user.email,
        created.id,
        created.collection
    );

    Ok(created.into_resource())
}

/// Replaces the body of an existing document.
pub fn update_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    collection: &str,
    id: &str,
    payload: Value,
) -> ServiceResult<ResourceDocument>
where
    R: DocumentWriter + ?Sized,
{
    let collection = Collection::parse(collection)?;
    ensure_can_manage(user, &collection)?;
    let id = parse_id(id)?;

    let payload = DocumentPayload::try_from(payload)?;
    payload.validate_for(&collection)?;

    let updated = repo.update_document(&collection, id, &payload.into_update())?;

    log::info!(
        "{} updated document {} in `{}` to version {}",
        user.email,
        updated.id,
        updated.collection,
        updated.version
    );

    Ok(updated.into_resource())
}

/// Removes a document by identifier.
pub fn delete_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    collection: &str,
    id: &str,
) -> ServiceResult<()>
where
    R: DocumentWriter + ?Sized,
{
    let collection = Collection::parse(collection)?;
    ensure_can_manage(user, &collection)?;
    let id = parse_id(id)?;

    repo.delete_document(&collection, id)?;

    log::info!("{} deleted document {id} from `{collection}`", user.email);

    Ok(())
}
