//! Typed page records decoded from loosely-typed documents.
//!
//! Every collection has an explicit mapping from wire fields to a record.
//! Required fields fail with [`DecodeError::MissingField`], fields of the
//! wrong JSON type fail with [`DecodeError::InvalidField`], and every optional
//! field has a documented fallback:
//!
//! | field | wire keys (first present wins) | fallback |
//! |---|---|---|
//! | `is_active` | `isActive` | `true` |
//! | `featured` | `featured` | `false` |
//! | `order` | `order` | `1` |
//! | news `excerpt` | `excerpt`, `summary` | `""` |
//! | news `image` | `image`, `imageUrl` | none |
//! | news `published_at` | `publishedAt`, `date` | none |
//! | legal `reference` | `reference`, `number` | none |
//! | legal `date` | `date`, `publishedAt` | none |
//! | photo `image_url` | `imageUrl`, `url`, `image` | required |
//! | video `video_url` | `videoUrl`, `url` | required |
//! | pharmacist `name` | `name`, `firstName` + `lastName` | required |
//! | pharmacy `city` / `district` | `ville`, `city` / `quartier`, `district` | none |
//! | pharmacy `on_duty` | `garde`, `onDuty` | `false` |

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::collection::Collection;
use crate::domain::document::ResourceDocument;
use crate::domain::types::Coordinates;

/// Errors raised while mapping a document onto a typed record.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has an invalid value: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("collection `{0}` has no record decoder")]
    UnsupportedCollection(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        field,
        reason: reason.into(),
    }
}

/// Visibility and ordering flags shared by every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFlags {
    pub is_active: bool,
    pub featured: bool,
    pub order: i64,
}

impl Default for RecordFlags {
    fn default() -> Self {
        Self {
            is_active: true,
            featured: false,
            order: 1,
        }
    }
}

/// Common accessors used by the listing pipeline.
pub trait Listed {
    fn flags(&self) -> RecordFlags;
    fn title(&self) -> &str;
    fn published_at(&self) -> Option<NaiveDateTime> {
        None
    }
}

/// Parses `YYYY-MM-DD`, naive ISO timestamps and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Typed view over the fields of a document.
struct Fields<'a> {
    doc: &'a ResourceDocument,
}

impl<'a> Fields<'a> {
    fn new(doc: &'a ResourceDocument) -> Self {
        Self { doc }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.doc.get(key).filter(|v| !v.is_null())
    }

    fn string(&self, key: &'static str) -> Result<Option<String>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(invalid(key, "expected a string")),
        }
    }

    fn first_string(&self, keys: &[&'static str]) -> Result<Option<String>, DecodeError> {
        for key in keys {
            if let Some(value) = self.string(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn required_string(&self, keys: &[&'static str]) -> Result<String, DecodeError> {
        self.first_string(keys)?
            .ok_or(DecodeError::MissingField(keys[0]))
    }

    /// `description`, else `content` rendered as text.
    fn description(&self) -> Result<String, DecodeError> {
        match self.string("description")? {
            Some(description) => Ok(description),
            None => Ok(self.text("content").trim().to_string()),
        }
    }

    /// Free-form content rendered as text; structured values are serialized.
    fn text(&self, key: &'static str) -> String {
        match self.present(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    fn bool(&self, key: &'static str) -> Result<Option<bool>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                other => Err(invalid(key, format!("expected a boolean, got `{other}`"))),
            },
            Some(_) => Err(invalid(key, "expected a boolean")),
        }
    }

    fn integer(&self, key: &'static str) -> Result<Option<i64>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| invalid(key, "expected an integer")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| invalid(key, "expected an integer")),
            Some(_) => Err(invalid(key, "expected an integer")),
        }
    }

    fn float(&self, key: &'static str) -> Result<Option<f64>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| invalid(key, "expected a number")),
            Some(_) => Err(invalid(key, "expected a number")),
        }
    }

    fn date(&self, keys: &[&'static str]) -> Result<Option<NaiveDateTime>, DecodeError> {
        for key in keys {
            if let Some(raw) = self.string(key)? {
                return parse_date(&raw)
                    .map(Some)
                    .ok_or_else(|| invalid(key, format!("unrecognised date `{raw}`")));
            }
        }
        Ok(None)
    }

    fn string_list(&self, key: &'static str) -> Result<Vec<String>, DecodeError> {
        match self.present(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.trim().to_string()),
                    _ => Err(invalid(key, "expected a list of strings")),
                })
                .filter(|item| !matches!(item, Ok(s) if s.is_empty()))
                .collect(),
            Some(Value::String(s)) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
            Some(_) => Err(invalid(key, "expected a list of strings")),
        }
    }

    fn flags(&self) -> Result<RecordFlags, DecodeError> {
        let defaults = RecordFlags::default();
        Ok(RecordFlags {
            is_active: self.bool("isActive")?.unwrap_or(defaults.is_active),
            featured: self.bool("featured")?.unwrap_or(defaults.featured),
            order: self.integer("order")?.unwrap_or(defaults.order),
        })
    }
}

/// News and article entries (`actualites`, `articles`).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub flags: RecordFlags,
}

impl NewsItem {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        Ok(Self {
            id: doc.id.clone(),
            title: f.required_string(&["title"])?,
            content: f.text("content"),
            excerpt: f
                .first_string(&["excerpt", "summary"])?
                .unwrap_or_default(),
            image: f.first_string(&["image", "imageUrl"])?,
            category: f.string("category")?,
            author: f.string("author")?,
            published_at: f.date(&["publishedAt", "date"])?,
            tags: f.string_list("tags")?,
            flags: f.flags()?,
        })
    }
}

/// Kind of official text published by the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LegalKind {
    Communique,
    Decision,
    Decret,
    Loi,
}

/// Press releases, decisions, decrees and laws.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalText {
    pub id: Option<String>,
    pub kind: LegalKind,
    pub title: String,
    pub reference: Option<String>,
    pub content: String,
    pub date: Option<NaiveDateTime>,
    pub pdf_url: Option<String>,
    pub flags: RecordFlags,
}

impl LegalText {
    pub fn decode(kind: LegalKind, doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        Ok(Self {
            id: doc.id.clone(),
            kind,
            title: f.required_string(&["title"])?,
            reference: f.first_string(&["reference", "number"])?,
            content: f.text("content"),
            date: f.date(&["date", "publishedAt"])?,
            pdf_url: f.first_string(&["pdfUrl", "fileUrl"])?,
            flags: f.flags()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub president: Option<String>,
    pub members: Vec<String>,
    pub flags: RecordFlags,
}

impl Commission {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        Ok(Self {
            id: doc.id.clone(),
            title: f.required_string(&["title", "name"])?,
            description: f.description()?,
            president: f.string("president")?,
            members: f.string_list("members")?,
            flags: f.flags()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thesis {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub university: Option<String>,
    pub supervisor: Option<String>,
    pub year: Option<i64>,
    pub summary: String,
    pub pdf_url: Option<String>,
    pub flags: RecordFlags,
}

impl Thesis {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        Ok(Self {
            id: doc.id.clone(),
            title: f.required_string(&["title"])?,
            author: f.string("author")?.unwrap_or_default(),
            university: f.string("university")?,
            supervisor: f.string("supervisor")?,
            year: f.integer("year")?,
            summary: f
                .first_string(&["abstract", "summary"])?
                .unwrap_or_default(),
            pdf_url: f.first_string(&["pdfUrl", "fileUrl"])?,
            flags: f.flags()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Option<String>,
    pub title: String,
    pub image_url: String,
    pub caption: String,
    pub album: Option<String>,
    pub taken_at: Option<NaiveDateTime>,
    pub flags: RecordFlags,
}

impl Photo {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        Ok(Self {
            id: doc.id.clone(),
            title: f.string("title")?.unwrap_or_default(),
            image_url: f.required_string(&["imageUrl", "url", "image"])?,
            caption: f
                .first_string(&["caption", "description"])?
                .unwrap_or_default(),
            album: f.string("album")?,
            taken_at: f.date(&["date", "takenAt"])?,
            flags: f.flags()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Option<String>,
    pub title: String,
    pub video_url: String,
    pub thumbnail: Option<String>,
    pub duration: Option<String>,
    pub description: String,
    pub published_at: Option<NaiveDateTime>,
    pub flags: RecordFlags,
}

impl Video {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        Ok(Self {
            id: doc.id.clone(),
            title: f.string("title")?.unwrap_or_default(),
            video_url: f.required_string(&["videoUrl", "url"])?,
            thumbnail: f.first_string(&["thumbnail", "thumbnailUrl"])?,
            duration: f.string("duration")?,
            description: f.string("description")?.unwrap_or_default(),
            published_at: f.date(&["publishedAt", "date"])?,
            flags: f.flags()?,
        })
    }
}

/// Registered pharmacist listed in the directory.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacist {
    pub id: Option<String>,
    pub name: String,
    pub registration_number: Option<String>,
    pub section: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub flags: RecordFlags,
}

impl Pharmacist {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        let name = match f.string("name")? {
            Some(name) => name,
            None => {
                let parts = [f.string("firstName")?, f.string("lastName")?];
                let joined = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");
                if joined.is_empty() {
                    return Err(DecodeError::MissingField("name"));
                }
                joined
            }
        };
        Ok(Self {
            id: doc.id.clone(),
            name,
            registration_number: f.first_string(&["numeroOrdre", "registrationNumber"])?,
            section: f.string("section")?,
            city: f.first_string(&["ville", "city"])?,
            phone: f.first_string(&["telephone", "phone"])?,
            email: f.string("email")?,
            flags: f.flags()?,
        })
    }
}

/// Pharmacy directory entry, optionally carrying a server-computed distance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub district: Option<String>,
    pub phone: Option<String>,
    pub on_duty: bool,
    pub coordinates: Option<Coordinates>,
    /// Distance in meters from the queried position.
    pub distance: Option<f64>,
    pub flags: RecordFlags,
}

impl Pharmacy {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        let coordinates = match (f.float("latitude")?, f.float("longitude")?) {
            (Some(lat), Some(lon)) => Some(
                Coordinates::new(lat, lon).map_err(|e| invalid("latitude", e.to_string()))?,
            ),
            _ => None,
        };
        let distance = f.float("distance")?;
        if distance.is_some_and(|d| d < 0.0) {
            return Err(invalid("distance", "must not be negative"));
        }
        let on_duty = match f.bool("garde")? {
            Some(garde) => garde,
            None => f.bool("onDuty")?.unwrap_or(false),
        };
        Ok(Self {
            id: doc.id.clone(),
            name: f.required_string(&["name", "nom"])?,
            address: f
                .first_string(&["address", "adresse"])?
                .unwrap_or_default(),
            city: f.first_string(&["ville", "city"])?,
            district: f.first_string(&["quartier", "district"])?,
            phone: f.first_string(&["telephone", "phone"])?,
            on_duty,
            coordinates,
            distance,
            flags: f.flags()?,
        })
    }
}

/// Continuing education session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub credits: Option<i64>,
    pub flags: RecordFlags,
}

impl Training {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        let start_date = f.date(&["startDate", "date"])?;
        let end_date = f.date(&["endDate"])?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                return Err(invalid("endDate", "ends before it starts"));
            }
        }
        Ok(Self {
            id: doc.id.clone(),
            title: f.required_string(&["title"])?,
            description: f.description()?,
            location: f.first_string(&["location", "lieu"])?,
            organizer: f.string("organizer")?,
            start_date,
            end_date,
            credits: f.integer("credits")?,
            flags: f.flags()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EthicsSection {
    pub title: String,
    pub content: String,
}

/// Code of ethics page (`deontologie`).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthicsCode {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub sections: Vec<EthicsSection>,
    pub flags: RecordFlags,
}

impl EthicsCode {
    pub fn decode(doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let f = Fields::new(doc);
        let sections = match f.present("sections") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let section = ResourceDocument::from_value(item.clone())
                        .ok_or_else(|| invalid("sections", "expected a list of objects"))?;
                    let sf = Fields::new(&section);
                    Ok(EthicsSection {
                        title: sf.required_string(&["title"])?,
                        content: sf.text("content"),
                    })
                })
                .collect::<Result<Vec<_>, DecodeError>>()?,
            Some(_) => return Err(invalid("sections", "expected a list of objects")),
        };
        Ok(Self {
            id: doc.id.clone(),
            title: f.required_string(&["title"])?,
            content: f.text("content"),
            sections,
            flags: f.flags()?,
        })
    }
}

macro_rules! impl_listed {
    ($ty:ty, $title:ident, $date:ident) => {
        impl Listed for $ty {
            fn flags(&self) -> RecordFlags {
                self.flags
            }

            fn title(&self) -> &str {
                &self.$title
            }

            fn published_at(&self) -> Option<NaiveDateTime> {
                self.$date
            }
        }
    };
    ($ty:ty, $title:ident) => {
        impl Listed for $ty {
            fn flags(&self) -> RecordFlags {
                self.flags
            }

            fn title(&self) -> &str {
                &self.$title
            }
        }
    };
}

impl_listed!(NewsItem, title, published_at);
impl_listed!(LegalText, title, date);
impl_listed!(Photo, title, taken_at);
impl_listed!(Video, title, published_at);
impl_listed!(Training, title, start_date);
impl_listed!(Commission, title);
impl_listed!(Thesis, title);
impl_listed!(Pharmacist, name);
impl_listed!(Pharmacy, name);
impl_listed!(EthicsCode, title);

/// A decoded document, tagged by the shape of its collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "camelCase")]
pub enum Record {
    News(NewsItem),
    Legal(LegalText),
    Commission(Commission),
    Thesis(Thesis),
    Photo(Photo),
    Video(Video),
    Pharmacist(Pharmacist),
    Pharmacy(Pharmacy),
    Training(Training),
    Ethics(EthicsCode),
}

impl Record {
    /// Decodes a document with the mapping registered for its collection.
    pub fn decode(collection: &Collection, doc: &ResourceDocument) -> Result<Self, DecodeError> {
        let record = match collection {
            Collection::Actualites | Collection::Articles => Record::News(NewsItem::decode(doc)?),
            Collection::Communiques => {
                Record::Legal(LegalText::decode(LegalKind::Communique, doc)?)
            }
            Collection::Decisions => Record::Legal(LegalText::decode(LegalKind::Decision, doc)?),
            Collection::Decrets => Record::Legal(LegalText::decode(LegalKind::Decret, doc)?),
            Collection::Lois => Record::Legal(LegalText::decode(LegalKind::Loi, doc)?),
            Collection::Commissions => Record::Commission(Commission::decode(doc)?),
            Collection::Theses => Record::Thesis(Thesis::decode(doc)?),
            Collection::Photos => Record::Photo(Photo::decode(doc)?),
            Collection::Videos => Record::Video(Video::decode(doc)?),
            Collection::Pharmaciens => Record::Pharmacist(Pharmacist::decode(doc)?),
            Collection::Pharmacies => Record::Pharmacy(Pharmacy::decode(doc)?),
            Collection::Formations => Record::Training(Training::decode(doc)?),
            Collection::Deontologie => Record::Ethics(EthicsCode::decode(doc)?),
            Collection::PageMocks | Collection::Other(_) => {
                return Err(DecodeError::UnsupportedCollection(collection.to_string()));
            }
        };
        Ok(record)
    }

    pub fn flags(&self) -> RecordFlags {
        match self {
            Record::News(r) => r.flags(),
            Record::Legal(r) => r.flags(),
            Record::Commission(r) => r.flags(),
            Record::Thesis(r) => r.flags(),
            Record::Photo(r) => r.flags(),
            Record::Video(r) => r.flags(),
            Record::Pharmacist(r) => r.flags(),
            Record::Pharmacy(r) => r.flags(),
            Record::Training(r) => r.flags(),
            Record::Ethics(r) => r.flags(),
        }
    }
}
