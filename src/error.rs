use thiserror::Error;

/// User-supplied criteria that cannot be submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid input: please enter a search term")]
    EmptyTerm,
    #[error("enter a valid year: {input:?}")]
    InvalidYear { input: String },
    #[error("fill all fields (title, author, year) to search by all")]
    IncompleteCombined,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("catalog returned {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("parse catalog response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize storage document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage path has no parent: {path}")]
    NoParent { path: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
