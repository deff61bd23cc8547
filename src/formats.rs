use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// One record of a catalog search or trending response, as sent upstream.
///
/// Every field is read on its own: a value of an unexpected type reads as absent
/// instead of rejecting the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDoc {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author_name: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub authors: Option<Vec<RawAuthor>>,
    #[serde(default, deserialize_with = "lenient")]
    pub first_publish_year: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub first_publish_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cover_i: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cover_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub edition_key: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<Vec<String>>,
}

impl RawDoc {
    /// Reads one upstream record. Anything but a JSON object is an empty record.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(%err, "catalog record is not an object");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAuthor {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<serde_json::Value>,
    #[serde(default, rename = "numFound")]
    pub num_found: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub works: Vec<serde_json::Value>,
}

/// Display-ready record for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub primary_author: String,
    pub first_published: Published,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverRef {
    CoverId(i64),
    LegacyCoverId(i64),
    Edition(Vec<String>),
}

/// First publication as reported upstream: a year, a free-form date, or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PublishedRepr", into = "PublishedRepr")]
pub enum Published {
    Year(i64),
    Date(String),
    Unknown,
}

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PublishedRepr {
    Year(i64),
    Text(String),
}

impl From<PublishedRepr> for Published {
    fn from(repr: PublishedRepr) -> Self {
        match repr {
            PublishedRepr::Year(year) => Published::Year(year),
            PublishedRepr::Text(text) if text.is_empty() || text == NOT_AVAILABLE => {
                Published::Unknown
            }
            PublishedRepr::Text(text) => Published::Date(text),
        }
    }
}

impl From<Published> for PublishedRepr {
    fn from(published: Published) -> Self {
        match published {
            Published::Year(year) => PublishedRepr::Year(year),
            Published::Date(date) => PublishedRepr::Text(date),
            Published::Unknown => PublishedRepr::Text(NOT_AVAILABLE.to_owned()),
        }
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::Year(year) => write!(f, "{year}"),
            Published::Date(date) => f.write_str(date),
            Published::Unknown => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Durable snapshot of a [`BookSummary`], keyed by `id` in the bookmark store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: Published,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverRef>,
}

impl From<&BookSummary> for BookmarkEntry {
    fn from(book: &BookSummary) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.primary_author.clone(),
            year: book.first_published.clone(),
            cover: book.cover.clone(),
        }
    }
}

/// One local page of results with the upstream match count it came with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<BookSummary>,
    pub total_count: u64,
}
