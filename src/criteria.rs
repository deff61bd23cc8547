use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchMode {
    #[default]
    Title,
    Author,
    Year,
    All,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Title => "title",
            SearchMode::Author => "author",
            SearchMode::Year => "year",
            SearchMode::All => "all",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchMode::Title),
            "author" => Ok(SearchMode::Author),
            "year" | "first_publish_year" => Ok(SearchMode::Year),
            "all" => Ok(SearchMode::All),
            _ => Err("unknown search mode"),
        }
    }
}

/// Field-scoped search predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    /// Single search box used by the title, author and year modes.
    Term,
    Title,
    Author,
    Year,
}

impl FromStr for InputField {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "term" | "query" => Ok(InputField::Term),
            "title" => Ok(InputField::Title),
            "author" => Ok(InputField::Author),
            "year" => Ok(InputField::Year),
            _ => Err("unknown input field"),
        }
    }
}

/// Raw text typed into the search form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInput {
    pub term: String,
    pub title: String,
    pub author: String,
    pub year: String,
}

impl PendingInput {
    pub fn set(&mut self, field: InputField, value: impl Into<String>) {
        let value = value.into();
        match field {
            InputField::Term => self.term = value,
            InputField::Title => self.title = value,
            InputField::Author => self.author = value,
            InputField::Year => self.year = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Validated, frozen search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    ByField { field: Field, term: String },
    ByYear { year: i64 },
    ByAll {
        title: String,
        author: String,
        year: String,
    },
}

impl SearchCriteria {
    pub fn from_input(mode: SearchMode, input: &PendingInput) -> Result<Self, ValidationError> {
        match mode {
            SearchMode::Title | SearchMode::Author => {
                let term = input.term.trim();
                if term.is_empty() {
                    return Err(ValidationError::EmptyTerm);
                }
                let field = if mode == SearchMode::Title {
                    Field::Title
                } else {
                    Field::Author
                };
                Ok(SearchCriteria::ByField {
                    field,
                    term: term.to_owned(),
                })
            }
            SearchMode::Year => {
                let raw = input.term.trim();
                if raw.is_empty() {
                    return Err(ValidationError::EmptyTerm);
                }
                let year = raw.parse::<i64>().map_err(|_| ValidationError::InvalidYear {
                    input: raw.to_owned(),
                })?;
                Ok(SearchCriteria::ByYear { year })
            }
            SearchMode::All => {
                let title = input.title.trim();
                let author = input.author.trim();
                let year = input.year.trim();
                if title.is_empty() || author.is_empty() || year.is_empty() {
                    return Err(ValidationError::IncompleteCombined);
                }
                Ok(SearchCriteria::ByAll {
                    title: title.to_owned(),
                    author: author.to_owned(),
                    year: year.to_owned(),
                })
            }
        }
    }

    pub fn mode(&self) -> SearchMode {
        match self {
            SearchCriteria::ByField {
                field: Field::Title,
                ..
            } => SearchMode::Title,
            SearchCriteria::ByField {
                field: Field::Author,
                ..
            } => SearchMode::Author,
            SearchCriteria::ByYear { .. } => SearchMode::Year,
            SearchCriteria::ByAll { .. } => SearchMode::All,
        }
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchCriteria::ByField { term, .. } => f.write_str(term),
            SearchCriteria::ByYear { year } => write!(f, "{year}"),
            SearchCriteria::ByAll {
                title,
                author,
                year,
            } => write!(f, "Title: {title}, Author: {author}, Year: {year}"),
        }
    }
}

/// A fetch request for one local page. Never mutated after it is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub criteria: SearchCriteria,
    pub local_page: u32,
}
