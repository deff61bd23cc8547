use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::criteria::SearchCriteria;
use crate::error::FetchError;
use crate::formats::{BookSummary, RawDoc, SearchResponse, TrendingResponse};
use crate::normalize;
use crate::pagination;

pub const DEFAULT_CATALOG_URL: &str = "https://openlibrary.org";

/// Trending feeds are cut to this many entries.
pub const TRENDING_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TrendingPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TrendingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingPeriod::Daily => "daily",
            TrendingPeriod::Weekly => "weekly",
            TrendingPeriod::Monthly => "monthly",
        }
    }
}

impl fmt::Display for TrendingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendingPeriod {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "today" => Ok(TrendingPeriod::Daily),
            "weekly" => Ok(TrendingPeriod::Weekly),
            "monthly" => Ok(TrendingPeriod::Monthly),
            _ => Err("unknown trending period"),
        }
    }
}

/// Raw GET access to the catalog service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build catalog http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, concat!("bookfinder/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

/// Records of one upstream search page, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamPage {
    pub records: Vec<RawDoc>,
    pub num_found: u64,
}

impl UpstreamPage {
    /// Cuts `[offset, offset + len)` out of the upstream records and normalizes it.
    ///
    /// Records without a key are dropped after the cut so they never shift the window.
    pub fn local_page(self, offset: usize, len: usize) -> Vec<BookSummary> {
        summarize_all(&pagination::local_slice(self.records, offset, len))
    }
}

#[derive(Clone)]
pub struct CatalogClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("parse catalog url: {base_url}"))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("catalog url must be http/https: {base_url}");
        }
        Ok(Self {
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{base_path}/{path}"));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    pub fn search_url(&self, criteria: &SearchCriteria, upstream_page: u32) -> Url {
        let mut url = self.endpoint("search.json");
        {
            let mut query = url.query_pairs_mut();
            match criteria {
                SearchCriteria::ByField { field, term } => {
                    query.append_pair(field.as_str(), term);
                }
                SearchCriteria::ByYear { year } => {
                    query.append_pair("q", &format!("first_publish_year:{year}"));
                }
                SearchCriteria::ByAll {
                    title,
                    author,
                    year,
                } => {
                    query.append_pair("title", title);
                    query.append_pair("author", author);
                    query.append_pair("first_publish_year", year);
                }
            }
            query.append_pair("page", &upstream_page.max(1).to_string());
        }
        url
    }

    pub fn trending_url(&self, period: TrendingPeriod) -> Url {
        self.endpoint(&format!("trending/{period}.json"))
    }

    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        upstream_page: u32,
    ) -> Result<UpstreamPage, FetchError> {
        let url = self.search_url(criteria, upstream_page);
        tracing::debug!(%url, "catalog search");
        let body = self.transport.get(&url).await?;
        parse_search(&url, &body, criteria)
    }

    pub async fn trending(&self, period: TrendingPeriod) -> Result<Vec<BookSummary>, FetchError> {
        let url = self.trending_url(period);
        tracing::debug!(%url, "catalog trending");
        let body = self.transport.get(&url).await?;
        parse_trending(&url, &body)
    }
}

fn parse_search(
    url: &Url,
    body: &str,
    criteria: &SearchCriteria,
) -> Result<UpstreamPage, FetchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })?;

    let mut records = raw_docs(response.docs);
    // The upstream `first_publish_year:` predicate is fuzzy; keep exact matches only.
    if let SearchCriteria::ByYear { year } = criteria {
        records.retain(|doc| doc.first_publish_year == Some(*year));
    }

    Ok(UpstreamPage {
        records,
        num_found: response.num_found,
    })
}

fn parse_trending(url: &Url, body: &str) -> Result<Vec<BookSummary>, FetchError> {
    let response: TrendingResponse =
        serde_json::from_str(body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })?;

    let works = response.works.into_iter().take(TRENDING_LIMIT).collect();
    Ok(summarize_all(&raw_docs(works)))
}

fn raw_docs(values: Vec<serde_json::Value>) -> Vec<RawDoc> {
    values.into_iter().map(RawDoc::from_value).collect()
}

fn summarize_all(docs: &[RawDoc]) -> Vec<BookSummary> {
    docs.iter()
        .filter_map(|doc| {
            let summary = normalize::summarize(doc);
            if summary.is_none() {
                tracing::debug!(title = ?doc.title, "dropping catalog record without key");
            }
            summary
        })
        .collect()
}
