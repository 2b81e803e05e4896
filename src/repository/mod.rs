use crate::{
    db::{DbConnection, DbPool, get_connection},
    domain::{
        collection::Collection,
        document::{Document, NewDocument, UpdateDocument},
        types::DocumentId,
    },
    repository::errors::RepositoryResult,
};

pub mod document;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;

#[derive(Debug, Clone)]
pub struct DocumentListQuery {
    pub collection: Collection,
}

impl DocumentListQuery {
    pub fn new(collection: Collection) -> Self {
        Self { collection }
    }
}

/// Documents that replace the whole content of a collection.
#[derive(Debug, Clone)]
pub struct CollectionReplacement {
    pub collection: Collection,
    pub documents: Vec<NewDocument>,
}

pub trait DocumentReader {
    /// Lists documents in insertion order with the total count.
    fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<(usize, Vec<Document>)>;
    fn get_document(
        &self,
        collection: &Collection,
        id: DocumentId,
    ) -> RepositoryResult<Option<Document>>;
}

pub trait DocumentWriter {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
    /// Replaces the body; fails with `Conflict` when the expected version is stale.
    fn update_document(
        &self,
        collection: &Collection,
        id: DocumentId,
        update: &UpdateDocument,
    ) -> RepositoryResult<Document>;
    fn delete_document(&self, collection: &Collection, id: DocumentId) -> RepositoryResult<()>;
    /// Empties each listed collection and inserts its documents, atomically.
    fn replace_collections(&self, batches: &[CollectionReplacement]) -> RepositoryResult<usize>;
}

/// Diesel-backed repository shared by every handler.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}
