use std::fmt;

use crate::formats::CoverRef;

pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";

const PLACEHOLDER_S: &str = "https://via.placeholder.com/80x120?text=No+Cover";
const PLACEHOLDER_M: &str = "https://via.placeholder.com/150x220?text=No+Cover";
const PLACEHOLDER_L: &str = "https://via.placeholder.com/200x300?text=No+Cover";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            CoverSize::Small => PLACEHOLDER_S,
            CoverSize::Medium => PLACEHOLDER_M,
            CoverSize::Large => PLACEHOLDER_L,
        }
    }
}

impl fmt::Display for CoverSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds cover image URLs; never fails, falling back to a placeholder of the same size.
#[derive(Debug, Clone)]
pub struct Covers {
    base_url: String,
}

impl Default for Covers {
    fn default() -> Self {
        Self::new(DEFAULT_COVERS_URL)
    }
}

impl Covers {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn image_url(&self, cover: Option<&CoverRef>, size: CoverSize) -> String {
        let base = &self.base_url;
        match cover {
            Some(CoverRef::CoverId(id)) | Some(CoverRef::LegacyCoverId(id)) => {
                format!("{base}/b/id/{id}-{size}.jpg")
            }
            Some(CoverRef::Edition(editions)) => match editions.first() {
                Some(olid) => format!("{base}/b/olid/{olid}-{size}.jpg"),
                None => size.placeholder().to_owned(),
            },
            None => size.placeholder().to_owned(),
        }
    }
}

/// Canonical detail page of a catalog item, e.g. `https://openlibrary.org/works/OL1W`.
pub fn detail_url(catalog_url: &str, id: &str) -> String {
    let base = catalog_url.trim_end_matches('/');
    if id.starts_with('/') {
        format!("{base}{id}")
    } else {
        format!("{base}/{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_ids_use_id_path() {
        let covers = Covers::default();
        assert_eq!(
            covers.image_url(Some(&CoverRef::CoverId(8231856)), CoverSize::Medium),
            "https://covers.openlibrary.org/b/id/8231856-M.jpg"
        );
        assert_eq!(
            covers.image_url(Some(&CoverRef::LegacyCoverId(5)), CoverSize::Large),
            "https://covers.openlibrary.org/b/id/5-L.jpg"
        );
    }

    #[test]
    fn edition_uses_first_olid() {
        let covers = Covers::new("http://127.0.0.1:9/");
        let cover = CoverRef::Edition(vec!["OL1M".to_owned(), "OL2M".to_owned()]);
        assert_eq!(
            covers.image_url(Some(&cover), CoverSize::Small),
            "http://127.0.0.1:9/b/olid/OL1M-S.jpg"
        );
    }

    #[test]
    fn missing_cover_degrades_to_size_placeholder() {
        let covers = Covers::default();
        for size in [CoverSize::Small, CoverSize::Medium, CoverSize::Large] {
            assert_eq!(covers.image_url(None, size), size.placeholder());
            assert_eq!(
                covers.image_url(Some(&CoverRef::Edition(Vec::new())), size),
                size.placeholder()
            );
        }
        assert!(CoverSize::Large.placeholder().contains("200x300"));
    }

    #[test]
    fn detail_url_joins_work_key() {
        assert_eq!(
            detail_url("https://openlibrary.org/", "/works/OL1W"),
            "https://openlibrary.org/works/OL1W"
        );
        assert_eq!(
            detail_url("https://openlibrary.org", "works/OL1W"),
            "https://openlibrary.org/works/OL1W"
        );
    }
}
