//! Field resolution from raw catalog records to [`BookSummary`].
//!
//! Each display field is resolved from an ordered list of upstream sources. The first
//! source that yields a usable value wins; when none does, the field falls back to a
//! sentinel instead of failing the record.

use crate::formats::{BookSummary, CoverRef, Published, RawDoc};

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSource {
    /// First entry of `author_name` (search documents).
    AuthorName,
    /// Name of the first entry of `authors` (work records).
    Authors,
}

pub const AUTHOR_SOURCES: &[AuthorSource] = &[AuthorSource::AuthorName, AuthorSource::Authors];

impl AuthorSource {
    fn resolve(self, doc: &RawDoc) -> Option<&str> {
        let name = match self {
            AuthorSource::AuthorName => doc.author_name.as_ref()?.first().map(String::as_str),
            AuthorSource::Authors => doc.authors.as_ref()?.first()?.name.as_deref(),
        };
        name.filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedSource {
    FirstPublishYear,
    FirstPublishDate,
}

pub const PUBLISHED_SOURCES: &[PublishedSource] = &[
    PublishedSource::FirstPublishYear,
    PublishedSource::FirstPublishDate,
];

impl PublishedSource {
    fn resolve(self, doc: &RawDoc) -> Option<Published> {
        match self {
            PublishedSource::FirstPublishYear => doc
                .first_publish_year
                .filter(|year| *year != 0)
                .map(Published::Year),
            PublishedSource::FirstPublishDate => doc
                .first_publish_date
                .as_deref()
                .map(str::trim)
                .filter(|date| !date.is_empty())
                .map(|date| Published::Date(date.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSource {
    CoverI,
    CoverId,
    EditionKey,
}

pub const COVER_SOURCES: &[CoverSource] = &[
    CoverSource::CoverI,
    CoverSource::CoverId,
    CoverSource::EditionKey,
];

impl CoverSource {
    fn resolve(self, doc: &RawDoc) -> Option<CoverRef> {
        match self {
            CoverSource::CoverI => doc.cover_i.filter(|id| *id > 0).map(CoverRef::CoverId),
            CoverSource::CoverId => doc
                .cover_id
                .filter(|id| *id > 0)
                .map(CoverRef::LegacyCoverId),
            CoverSource::EditionKey => {
                let editions = doc
                    .edition_key
                    .as_ref()?
                    .iter()
                    .filter(|key| !key.trim().is_empty())
                    .cloned()
                    .collect::<Vec<_>>();
                (!editions.is_empty()).then_some(CoverRef::Edition(editions))
            }
        }
    }
}

pub fn resolve_author(doc: &RawDoc) -> String {
    AUTHOR_SOURCES
        .iter()
        .find_map(|source| source.resolve(doc))
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_owned()
}

pub fn resolve_published(doc: &RawDoc) -> Published {
    PUBLISHED_SOURCES
        .iter()
        .find_map(|source| source.resolve(doc))
        .unwrap_or(Published::Unknown)
}

pub fn resolve_cover(doc: &RawDoc) -> Option<CoverRef> {
    COVER_SOURCES.iter().find_map(|source| source.resolve(doc))
}

fn all_authors(doc: &RawDoc) -> Vec<String> {
    if let Some(names) = doc.author_name.as_ref().filter(|names| !names.is_empty()) {
        return names.clone();
    }
    doc.authors
        .iter()
        .flatten()
        .filter_map(|author| author.name.clone())
        .collect()
}

/// Records without a usable key are not addressable and yield `None`.
pub fn summarize(doc: &RawDoc) -> Option<BookSummary> {
    let id = doc.key.as_deref().map(str::trim).filter(|key| !key.is_empty())?;

    Some(BookSummary {
        id: id.to_owned(),
        title: doc.title.clone().unwrap_or_default(),
        primary_author: resolve_author(doc),
        first_published: resolve_published(doc),
        cover: resolve_cover(doc),
        authors: all_authors(doc),
        languages: doc.language.clone().unwrap_or_default(),
    })
}
