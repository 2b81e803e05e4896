//! Loosely-typed documents as stored and as exchanged over HTTP.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::collection::Collection;
use crate::domain::types::{DocumentId, Version};

/// Keys owned by the store; client-supplied values are discarded on write.
pub const RESERVED_KEYS: [&str; 4] = ["_id", "version", "createdAt", "updatedAt"];

/// Generic document envelope: optional identifier and content plus an open
/// set of named fields. `title` lives in `fields` like any other field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ResourceDocument {
    pub id: Option<String>,
    pub content: Option<Value>,
    pub fields: Map<String, Value>,
}

impl ResourceDocument {
    /// Looks up a field by wire name, including `content`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match key {
            "content" => self.content.as_ref(),
            _ => self.fields.get(key),
        }
    }

    /// The title, when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.fields
            .insert("title".to_string(), Value::String(title.into()));
    }

    /// Converts a JSON value into a document, ignoring anything but objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.into()),
            _ => None,
        }
    }

    /// Consumes the document returning the flat wire representation.
    pub fn into_map(self) -> Map<String, Value> {
        self.into()
    }
}

impl From<Map<String, Value>> for ResourceDocument {
    fn from(mut map: Map<String, Value>) -> Self {
        let id = match map.remove("_id") {
            Some(Value::String(id)) => Some(id),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        };
        let content = map.remove("content").filter(|v| !v.is_null());
        Self {
            id,
            content,
            fields: map,
        }
    }
}

impl From<ResourceDocument> for Map<String, Value> {
    fn from(doc: ResourceDocument) -> Self {
        let mut map = Map::new();
        if let Some(id) = doc.id {
            map.insert("_id".to_string(), Value::String(id));
        }
        if let Some(content) = doc.content {
            map.insert("content".to_string(), content);
        }
        for (key, value) in doc.fields {
            map.entry(key).or_insert(value);
        }
        map
    }
}

/// A document persisted in a collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub collection: Collection,
    pub body: Map<String, Value>,
    pub version: Version,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Document {
    /// Flattens the stored body with the store-owned metadata.
    pub fn into_resource(self) -> ResourceDocument {
        let mut map = self.body;
        map.insert("_id".to_string(), Value::String(self.id.to_string()));
        map.insert("version".to_string(), Value::from(self.version.get()));
        map.insert(
            "createdAt".to_string(),
            Value::String(self.created_at.and_utc().to_rfc3339()),
        );
        map.insert(
            "updatedAt".to_string(),
            Value::String(self.updated_at.and_utc().to_rfc3339()),
        );
        map.into()
    }
}

fn strip_reserved(mut body: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        body.remove(key);
    }
    body
}

/// Payload for inserting a document.
#[derive(Clone, Debug, PartialEq)]
pub struct NewDocument {
    pub collection: Collection,
    pub body: Map<String, Value>,
}

impl NewDocument {
    #[must_use]
    pub fn new(collection: Collection, body: Map<String, Value>) -> Self {
        Self {
            collection,
            body: strip_reserved(body),
        }
    }
}

/// Full-document replacement, optionally guarded by the version the editor
/// started from.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateDocument {
    pub body: Map<String, Value>,
    pub expected_version: Option<Version>,
}

impl UpdateDocument {
    #[must_use]
    pub fn new(body: Map<String, Value>, expected_version: Option<Version>) -> Self {
        Self {
            body: strip_reserved(body),
            expected_version,
        }
    }
}
