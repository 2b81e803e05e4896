//! Diesel implementation of the document repository.

use chrono::{Duration, Utc};
use diesel::prelude::*;

use crate::{
    domain::{
        collection::Collection,
        document::{Document, NewDocument, UpdateDocument},
        types::{DocumentId, Version},
    },
    models::document::{
        Document as DbDocument, NewDocument as DbNewDocument, UpdateDocument as DbUpdateDocument,
        encode_body,
    },
    repository::{
        CollectionReplacement, DieselRepository, DocumentListQuery, DocumentReader,
        DocumentWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl DocumentReader for DieselRepository {
    fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<(usize, Vec<Document>)> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let name = query.collection.as_str();

        let documents = documents::table
            .filter(documents::collection.eq(name))
            .order((documents::created_at.asc(), documents::id.asc()))
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(Document::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((documents.len(), documents))
    }

    fn get_document(
        &self,
        collection: &Collection,
        id: DocumentId,
    ) -> RepositoryResult<Option<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;

        let row = documents::table
            .filter(documents::collection.eq(collection.as_str()))
            .filter(documents::id.eq(id.to_string()))
            .first::<DbDocument>(&mut conn)
            .optional()?;

        row.map(Document::try_from).transpose()
    }
}

impl DocumentWriter for DieselRepository {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let row = DbNewDocument::from_domain(new_document, Utc::now().naive_utc())?;

        let created = diesel::insert_into(documents::table)
            .values(&row)
            .get_result::<DbDocument>(&mut conn)?;

        Document::try_from(created)
    }

    fn update_document(
        &self,
        collection: &Collection,
        id: DocumentId,
        update: &UpdateDocument,
    ) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let id = id.to_string();
        let body = encode_body(&update.body)?;

        // Immediate: the write lock is taken before the version is read.
        conn.immediate_transaction::<Document, RepositoryError, _>(|conn| {
            let current = documents::table
                .filter(documents::collection.eq(collection.as_str()))
                .filter(documents::id.eq(&id))
                .first::<DbDocument>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if let Some(expected) = update.expected_version {
                if expected.get() != current.version {
                    return Err(RepositoryError::Conflict {
                        expected: expected.get(),
                        actual: current.version,
                    });
                }
            }

            let next = Version::new(current.version)?.next();
            let changes = DbUpdateDocument {
                body,
                version: next.get(),
                updated_at: Utc::now().naive_utc(),
            };

            let updated = diesel::update(
                documents::table
                    .filter(documents::id.eq(&id))
                    .filter(documents::version.eq(current.version)),
            )
            .set(&changes)
            .get_result::<DbDocument>(conn)
            .optional()?
            .ok_or(RepositoryError::Conflict {
                expected: current.version,
                actual: next.get(),
            })?;

            Document::try_from(updated)
        })
    }

    fn delete_document(&self, collection: &Collection, id: DocumentId) -> RepositoryResult<()> {
        use crate::schema::documents;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            documents::table
                .filter(documents::collection.eq(collection.as_str()))
                .filter(documents::id.eq(id.to_string())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn replace_collections(&self, batches: &[CollectionReplacement]) -> RepositoryResult<usize> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for batch in batches {
                let removed = diesel::delete(
                    documents::table.filter(documents::collection.eq(batch.collection.as_str())),
                )
                .execute(conn)?;
                log::info!(
                    "Removed {removed} document(s) from `{}`",
                    batch.collection
                );

                if batch.documents.is_empty() {
                    continue;
                }

                // Stagger timestamps so listings keep fixture order.
                let rows = batch
                    .documents
                    .iter()
                    .enumerate()
                    .map(|(i, doc)| {
                        DbNewDocument::from_domain(doc, now + Duration::microseconds(i as i64))
                    })
                    .collect::<RepositoryResult<Vec<_>>>()?;

                inserted += diesel::insert_into(documents::table)
                    .values(&rows)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }
}
