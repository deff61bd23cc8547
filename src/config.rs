use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use directories::ProjectDirs;

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::cli::GlobalArgs;
use crate::covers::DEFAULT_COVERS_URL;

pub const ENV_CATALOG_URL: &str = "BOOKFINDER_CATALOG_URL";
pub const ENV_COVERS_URL: &str = "BOOKFINDER_COVERS_URL";
pub const ENV_BOOKMARKS_FILE: &str = "BOOKFINDER_BOOKMARKS_FILE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "BOOKFINDER_HTTP_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;
const STORAGE_FILE_NAME: &str = "local_storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_url: String,
    pub covers_url: String,
    pub bookmarks_file: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let catalog_url =
            non_empty(ENV_CATALOG_URL).unwrap_or_else(|| DEFAULT_CATALOG_URL.to_owned());
        let covers_url = non_empty(ENV_COVERS_URL).unwrap_or_else(|| DEFAULT_COVERS_URL.to_owned());
        let bookmarks_file = match non_empty(ENV_BOOKMARKS_FILE) {
            Some(path) => PathBuf::from(path),
            None => default_bookmarks_file()?,
        };
        let http_timeout = match non_empty(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.parse::<u64>().with_context(|| {
                    format!("invalid {ENV_HTTP_TIMEOUT_SECS}={raw:?}. expected whole seconds")
                })?;
                if secs == 0 {
                    anyhow::bail!("{ENV_HTTP_TIMEOUT_SECS} must be > 0");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            catalog_url,
            covers_url,
            bookmarks_file,
            http_timeout,
        })
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(url) = args.catalog_url.as_deref() {
            self.catalog_url = url.to_owned();
        }
        if let Some(url) = args.covers_url.as_deref() {
            self.covers_url = url.to_owned();
        }
        if let Some(path) = args.bookmarks_file.as_deref() {
            self.bookmarks_file = PathBuf::from(path);
        }
        self
    }
}

fn default_bookmarks_file() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "bookfinder", "bookfinder").with_context(|| {
        format!("resolve data dir (set {ENV_BOOKMARKS_FILE} or --bookmarks-file)")
    })?;
    Ok(dirs.data_dir().join(STORAGE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_values_are_used() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[
            (ENV_CATALOG_URL, "http://127.0.0.1:9000"),
            (ENV_COVERS_URL, "http://127.0.0.1:9001"),
            (ENV_BOOKMARKS_FILE, "/tmp/bookfinder/storage.json"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
        ]))?;
        assert_eq!(config.catalog_url, "http://127.0.0.1:9000");
        assert_eq!(config.covers_url, "http://127.0.0.1:9001");
        assert_eq!(
            config.bookmarks_file,
            PathBuf::from("/tmp/bookfinder/storage.json")
        );
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn defaults_point_at_open_library() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[(ENV_BOOKMARKS_FILE, "storage.json")]))?;
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.covers_url, DEFAULT_COVERS_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(20));
        Ok(())
    }

    #[test]
    fn invalid_timeout_is_an_error() {
        let err = Config::from_lookup(lookup(&[
            (ENV_BOOKMARKS_FILE, "storage.json"),
            (ENV_HTTP_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err()
        .to_string();
        assert!(err.contains(ENV_HTTP_TIMEOUT_SECS));

        assert!(
            Config::from_lookup(lookup(&[
                (ENV_BOOKMARKS_FILE, "storage.json"),
                (ENV_HTTP_TIMEOUT_SECS, "0"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn flags_override_env() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[(ENV_BOOKMARKS_FILE, "env.json")]))?;
        let config = config.with_overrides(&GlobalArgs {
            catalog_url: Some("http://localhost:1".to_owned()),
            covers_url: None,
            bookmarks_file: Some("flag.json".to_owned()),
        });
        assert_eq!(config.catalog_url, "http://localhost:1");
        assert_eq!(config.covers_url, DEFAULT_COVERS_URL);
        assert_eq!(config.bookmarks_file, PathBuf::from("flag.json"));
        Ok(())
    }
}
