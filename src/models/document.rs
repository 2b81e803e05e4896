//! Diesel models for the `documents` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::{Map, Value};

use crate::domain::collection::Collection;
use crate::domain::document::{Document as DomainDocument, NewDocument as DomainNewDocument};
use crate::domain::types::{DocumentId, Version};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::documents)]
/// Diesel model for [`crate::domain::document::Document`].
pub struct Document {
    pub id: String,
    pub collection: String,
    pub body: String, // JSON object text
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
/// Insertable form of [`Document`].
pub struct NewDocument<'a> {
    pub id: String,
    pub collection: &'a str,
    pub body: String,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::documents)]
/// Full-body replacement applied on update.
pub struct UpdateDocument {
    pub body: String,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

/// Serializes a body for storage.
pub fn encode_body(body: &Map<String, Value>) -> Result<String, RepositoryError> {
    Ok(serde_json::to_string(body)?)
}

impl TryFrom<Document> for DomainDocument {
    type Error = RepositoryError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let body = match serde_json::from_str::<Value>(&doc.body)? {
            Value::Object(map) => map,
            _ => {
                return Err(RepositoryError::ValidationError(format!(
                    "Document {} does not hold a JSON object",
                    doc.id
                )));
            }
        };

        Ok(DomainDocument {
            id: doc.id.parse::<DocumentId>()?,
            collection: Collection::from(doc.collection),
            body,
            version: Version::new(doc.version)?,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

impl<'a> NewDocument<'a> {
    /// Builds a row with a fresh identifier and initial version.
    pub fn from_domain(
        doc: &'a DomainNewDocument,
        now: NaiveDateTime,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: DocumentId::new().to_string(),
            collection: doc.collection.as_str(),
            body: encode_body(&doc.body)?,
            version: Version::INITIAL.get(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn row(body: &str) -> Document {
        let now = Utc::now().naive_utc();
        Document {
            id: DocumentId::new().to_string(),
            collection: "lois".to_string(),
            body: body.to_string(),
            version: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_into_domain() {
        let domain = DomainDocument::try_from(row(r#"{"title":"Loi"}"#)).unwrap();
        assert_eq!(domain.collection, Collection::Lois);
        assert_eq!(domain.version.get(), 3);
        assert_eq!(domain.body.get("title"), Some(&json!("Loi")));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(
            DomainDocument::try_from(row("[1, 2]")),
            Err(RepositoryError::ValidationError(_))
        ));
        assert!(DomainDocument::try_from(row("{not json")).is_err());
    }

    #[test]
    fn new_row_starts_at_initial_version() {
        let domain = DomainNewDocument::new(
            Collection::Videos,
            json!({"title": "Clip"}).as_object().cloned().unwrap_or_default(),
        );
        let now = Utc::now().naive_utc();
        let new = NewDocument::from_domain(&domain, now).unwrap();
        assert_eq!(new.collection, "videos");
        assert_eq!(new.version, 1);
        assert!(new.id.parse::<DocumentId>().is_ok());
    }
}
