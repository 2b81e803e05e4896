use serde_json::{Map, Value};

use crate::domain::collection::Collection;
use crate::domain::document::{NewDocument, ResourceDocument, UpdateDocument};
use crate::domain::records::{DecodeError, Record};
use crate::domain::types::{DocumentTitle, Version};
use crate::forms::FormError;

/// Largest PDF an admin may reference.
pub const MAX_PDF_BYTES: u64 = 10 * 1024 * 1024;

/// Validated admin write payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    pub body: Map<String, Value>,
    /// Version the editor last saw, when supplied.
    pub version: Option<Version>,
}

impl TryFrom<Value> for DocumentPayload {
    type Error = FormError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut body) = value else {
            return Err(FormError::NotAnObject);
        };

        if let Some(title) = body.get("title") {
            let title = title.as_str().ok_or(FormError::InvalidTitle)?;
            let title = DocumentTitle::new(title).map_err(|_| FormError::InvalidTitle)?;
            body.insert("title".to_string(), Value::String(title.into_inner()));
        }

        if let Some(Value::String(content)) = body.get("content") {
            let sanitized = ammonia::clean(content);
            body.insert("content".to_string(), Value::String(sanitized));
        }

        if let Some(url) = body.get("pdfUrl").and_then(Value::as_str) {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            if !url.is_empty() && !path.to_ascii_lowercase().ends_with(".pdf") {
                return Err(FormError::NotPdf);
            }
        }

        if let Some(size) = pdf_size(body.get("pdfSize"))? {
            if size > MAX_PDF_BYTES as f64 {
                return Err(FormError::FileTooLarge { max: MAX_PDF_BYTES });
            }
        }

        let version = match body.get("version") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let raw = value.as_i64().ok_or(FormError::InvalidVersion)?;
                Some(Version::new(raw).map_err(|_| FormError::InvalidVersion)?)
            }
        };

        Ok(Self { body, version })
    }
}

/// Reads `pdfSize` given as a number or a numeric string.
fn pdf_size(value: Option<&Value>) -> Result<Option<f64>, FormError> {
    let size = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match size {
        Some(size) if size.is_finite() && size >= 0.0 => Ok(Some(size)),
        _ => Err(FormError::InvalidPdfSize),
    }
}

impl DocumentPayload {
    /// Checks the payload against the record shape of `collection`.
    ///
    /// Collections without a registered decoder accept any object.
    pub fn validate_for(&self, collection: &Collection) -> Result<(), DecodeError> {
        let doc = ResourceDocument::from(self.body.clone());
        match Record::decode(collection, &doc) {
            Ok(_) | Err(DecodeError::UnsupportedCollection(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub fn into_new_document(self, collection: Collection) -> NewDocument {
        NewDocument::new(collection, self.body)
    }

    pub fn into_update(self) -> UpdateDocument {
        UpdateDocument::new(self.body, self.version)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            DocumentPayload::try_from(json!(["a"])),
            Err(FormError::NotAnObject)
        ));
    }

    #[test]
    fn rejects_blank_title() {
        assert!(matches!(
            DocumentPayload::try_from(json!({"title": "   "})),
            Err(FormError::InvalidTitle)
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"title": 3})),
            Err(FormError::InvalidTitle)
        ));
    }

    #[test]
    fn sanitizes_string_content() {
        let payload = DocumentPayload::try_from(json!({
            "title": "Communiqué",
            "content": "<p>ok</p><script>alert(1)</script>"
        }))
        .unwrap();
        assert_eq!(payload.body["content"], json!("<p>ok</p>"));
    }

    #[test]
    fn leaves_structured_content_alone() {
        let payload = DocumentPayload::try_from(json!({
            "content": {"blocks": ["<b>x</b>"]}
        }))
        .unwrap();
        assert_eq!(payload.body["content"], json!({"blocks": ["<b>x</b>"]}));
    }

    #[test]
    fn enforces_pdf_limits() {
        assert!(matches!(
            DocumentPayload::try_from(json!({"pdfSize": MAX_PDF_BYTES + 1})),
            Err(FormError::FileTooLarge { .. })
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"pdfUrl": "https://cdn.example.com/loi.docx"})),
            Err(FormError::NotPdf)
        ));
        assert!(
            DocumentPayload::try_from(json!({
                "pdfUrl": "https://cdn.example.com/loi.PDF?v=2",
                "pdfSize": MAX_PDF_BYTES
            }))
            .is_ok()
        );
    }

    #[test]
    fn pdf_size_limit_applies_to_floats_and_strings() {
        let over = (MAX_PDF_BYTES * 5) as f64;
        assert!(matches!(
            DocumentPayload::try_from(json!({"title": "t", "pdfSize": over})),
            Err(FormError::FileTooLarge { .. })
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"title": "t", "pdfSize": "52428800"})),
            Err(FormError::FileTooLarge { .. })
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"pdfSize": -1})),
            Err(FormError::InvalidPdfSize)
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"pdfSize": "dix"})),
            Err(FormError::InvalidPdfSize)
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"pdfSize": true})),
            Err(FormError::InvalidPdfSize)
        ));
        assert!(DocumentPayload::try_from(json!({"pdfSize": "1048576"})).is_ok());
        assert!(DocumentPayload::try_from(json!({"pdfSize": 2048.5})).is_ok());
        assert!(DocumentPayload::try_from(json!({"pdfSize": null})).is_ok());
    }

    #[test]
    fn structured_content_passes_record_validation() {
        let payload = DocumentPayload::try_from(json!({
            "title": "Commission éthique",
            "content": {"blocks": ["x"]}
        }))
        .unwrap();
        assert!(payload.validate_for(&Collection::Commissions).is_ok());
        assert!(payload.validate_for(&Collection::Formations).is_ok());
    }

    #[test]
    fn extracts_version() {
        let payload = DocumentPayload::try_from(json!({"title": "a", "version": 4})).unwrap();
        assert_eq!(payload.version, Some(Version::new(4).unwrap()));

        assert!(matches!(
            DocumentPayload::try_from(json!({"version": 0})),
            Err(FormError::InvalidVersion)
        ));
        assert!(matches!(
            DocumentPayload::try_from(json!({"version": "2"})),
            Err(FormError::InvalidVersion)
        ));
    }

    #[test]
    fn validates_known_collections_only() {
        let payload = DocumentPayload::try_from(json!({"excerpt": "sans titre"})).unwrap();
        assert!(payload.validate_for(&Collection::Actualites).is_err());
        assert!(payload.validate_for(&Collection::PageMocks).is_ok());
        assert!(payload.validate_for(&Collection::from("custom")).is_ok());
    }

    #[test]
    fn update_strips_reserved_keys() {
        let payload = DocumentPayload::try_from(json!({
            "_id": "x",
            "title": "a",
            "version": 2,
            "createdAt": "2024-01-01"
        }))
        .unwrap();
        let update = payload.into_update();
        assert_eq!(update.expected_version, Some(Version::new(2).unwrap()));
        assert!(!update.body.contains_key("_id"));
        assert!(!update.body.contains_key("version"));
        assert!(!update.body.contains_key("createdAt"));
    }
}
