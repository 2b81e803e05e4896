//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::collection::Collection;
use crate::domain::document::{Document, NewDocument, UpdateDocument};
use crate::domain::types::DocumentId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    CollectionReplacement, DocumentListQuery, DocumentReader, DocumentWriter,
};

mock! {
    pub Repository {}

    impl DocumentReader for Repository {
        fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<(usize, Vec<Document>)>;
        fn get_document(
            &self,
            collection: &Collection,
            id: DocumentId,
        ) -> RepositoryResult<Option<Document>>;
    }

    impl DocumentWriter for Repository {
        fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
        fn update_document(
            &self,
            collection: &Collection,
            id: DocumentId,
            update: &UpdateDocument,
        ) -> RepositoryResult<Document>;
        fn delete_document(&self, collection: &Collection, id: DocumentId) -> RepositoryResult<()>;
        fn replace_collections(&self, batches: &[CollectionReplacement]) -> RepositoryResult<usize>;
    }
}
