//! Search state machine.
//!
//! All state changes go through named transitions (`submit`, `change_page`,
//! `change_mode`, `reset`, `select_trending`). A transition that needs data returns a
//! ticket; the caller runs it against the catalog and hands the completion back through
//! `apply_search` / `apply_trending`. Each ticket carries a sequence number and only the
//! most recently issued one is ever applied, so a slow response can never overwrite a
//! newer one.

use crate::catalog::{CatalogClient, TrendingPeriod};
use crate::criteria::{InputField, PageRequest, PendingInput, SearchCriteria, SearchMode};
use crate::error::{Error, FetchError, ValidationError};
use crate::formats::{BookSummary, SearchResult};
use crate::pagination::{self, LOCAL_PAGE_SIZE, UPSTREAM_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub mode: SearchMode,
    pub pending: PendingInput,
    pub active: Option<SearchCriteria>,
    pub page: u32,
    pub result: Option<SearchResult>,
    pub status: Status,
    pub trending_period: TrendingPeriod,
    pub trending: Vec<BookSummary>,
    pub trending_status: Status,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            pending: PendingInput::default(),
            active: None,
            page: 1,
            result: None,
            status: Status::Idle,
            trending_period: TrendingPeriod::default(),
            trending: Vec::new(),
            trending_status: Status::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub request: PageRequest,
}

impl SearchTicket {
    /// Fetches the upstream page holding `request.local_page` and cuts the local slice.
    pub async fn run(self, client: &CatalogClient) -> SearchCompletion {
        let window = pagination::resolve(
            self.request.local_page,
            LOCAL_PAGE_SIZE,
            UPSTREAM_PAGE_SIZE,
        );
        let outcome = client
            .search(&self.request.criteria, window.page)
            .await
            .map(|page| SearchResult {
                total_count: page.num_found,
                items: page.local_page(window.offset, LOCAL_PAGE_SIZE),
            });
        SearchCompletion {
            seq: self.seq,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct SearchCompletion {
    pub seq: u64,
    pub outcome: Result<SearchResult, FetchError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingTicket {
    pub seq: u64,
    pub period: TrendingPeriod,
}

impl TrendingTicket {
    pub async fn run(self, client: &CatalogClient) -> TrendingCompletion {
        TrendingCompletion {
            seq: self.seq,
            outcome: client.trending(self.period).await,
        }
    }
}

#[derive(Debug)]
pub struct TrendingCompletion {
    pub seq: u64,
    pub outcome: Result<Vec<BookSummary>, FetchError>,
}

/// What happened to a completion handed back to the controller.
#[derive(Debug)]
pub enum Applied {
    Updated,
    /// A newer request was issued after this one; state is untouched.
    Discarded,
    Failed(FetchError),
}

#[derive(Debug)]
pub struct QueryController {
    client: CatalogClient,
    state: QueryState,
    search_seq: u64,
    trending_seq: u64,
}

impl QueryController {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            state: QueryState::default(),
            search_seq: 0,
            trending_seq: 0,
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn set_input(&mut self, field: InputField, value: impl Into<String>) {
        self.state.pending.set(field, value);
    }

    /// Freezes the pending input as the active search and restarts at page 1.
    ///
    /// Invalid input leaves every part of the state as it was.
    pub fn submit(&mut self) -> Result<SearchTicket, ValidationError> {
        let criteria = SearchCriteria::from_input(self.state.mode, &self.state.pending)?;
        self.state.active = Some(criteria.clone());
        self.state.page = 1;
        Ok(self.issue_search(criteria, 1))
    }

    /// Moves to `page`, clamped to the known page range.
    ///
    /// Returns `None` when nothing is active or the page does not change. Asking again
    /// for a page whose fetch failed re-issues it.
    pub fn change_page(&mut self, page: u32) -> Option<SearchTicket> {
        let criteria = self.state.active.clone()?;
        let mut page = page.max(1);
        if self.state.result.is_some() {
            page = page.min(self.total_pages());
        }
        if page == self.state.page && self.state.status != Status::Failed {
            return None;
        }
        self.state.page = page;
        Some(self.issue_search(criteria, page))
    }

    pub fn next_page(&mut self) -> Option<SearchTicket> {
        self.change_page(self.state.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<SearchTicket> {
        self.change_page(self.state.page.saturating_sub(1))
    }

    /// Re-issues the current page of the active search, e.g. after a failure.
    pub fn refresh(&mut self) -> Option<SearchTicket> {
        let criteria = self.state.active.clone()?;
        Some(self.issue_search(criteria, self.state.page))
    }

    /// Switches the search form and drops the active search and its results.
    pub fn change_mode(&mut self, mode: SearchMode) {
        self.state.mode = mode;
        self.state.pending.clear();
        self.state.active = None;
        self.state.page = 1;
        self.state.result = None;
        self.state.status = Status::Idle;
        // Outstanding search responses belong to the dropped search.
        self.search_seq += 1;
    }

    /// Returns to the trending view with the default search mode.
    pub fn reset(&mut self) {
        self.change_mode(SearchMode::default());
    }

    pub fn select_trending(&mut self, period: TrendingPeriod) -> TrendingTicket {
        self.trending_seq += 1;
        self.state.trending_period = period;
        self.state.trending_status = Status::Loading;
        TrendingTicket {
            seq: self.trending_seq,
            period,
        }
    }

    pub fn apply_search(&mut self, completion: SearchCompletion) -> Applied {
        if completion.seq != self.search_seq {
            tracing::debug!(
                seq = completion.seq,
                latest = self.search_seq,
                "discarding stale search response"
            );
            return Applied::Discarded;
        }

        match completion.outcome {
            Ok(result) => {
                tracing::debug!(
                    items = result.items.len(),
                    total = result.total_count,
                    page = self.state.page,
                    "search loaded"
                );
                self.state.result = Some(result);
                self.state.status = Status::Loaded;
                Applied::Updated
            }
            Err(err) => {
                tracing::warn!(%err, "search failed");
                self.state.status = Status::Failed;
                Applied::Failed(err)
            }
        }
    }

    pub fn apply_trending(&mut self, completion: TrendingCompletion) -> Applied {
        if completion.seq != self.trending_seq {
            tracing::debug!(
                seq = completion.seq,
                latest = self.trending_seq,
                "discarding stale trending response"
            );
            return Applied::Discarded;
        }

        match completion.outcome {
            Ok(books) => {
                self.state.trending = books;
                self.state.trending_status = Status::Loaded;
                Applied::Updated
            }
            Err(err) => {
                tracing::warn!(%err, period = %self.state.trending_period, "trending failed");
                self.state.trending.clear();
                self.state.trending_status = Status::Failed;
                Applied::Failed(err)
            }
        }
    }

    /// Submits the pending input and waits for the first page.
    pub async fn search(&mut self) -> Result<Applied, ValidationError> {
        let ticket = self.submit()?;
        let completion = ticket.run(&self.client).await;
        Ok(self.apply_search(completion))
    }

    pub async fn go_to_page(&mut self, page: u32) -> Option<Applied> {
        let ticket = self.change_page(page)?;
        let completion = ticket.run(&self.client).await;
        Some(self.apply_search(completion))
    }

    pub async fn load_trending(&mut self, period: TrendingPeriod) -> Applied {
        let ticket = self.select_trending(period);
        let completion = ticket.run(&self.client).await;
        self.apply_trending(completion)
    }

    /// Like [`QueryController::search`], with every failure folded into [`Error`].
    pub async fn search_page(&mut self, page: u32) -> Result<&SearchResult, Error> {
        if let Applied::Failed(err) = self.search().await? {
            return Err(err.into());
        }
        if page > 1
            && let Some(Applied::Failed(err)) = self.go_to_page(page).await
        {
            return Err(err.into());
        }
        Ok(self.state.result.get_or_insert_with(SearchResult::default))
    }

    pub fn total_pages(&self) -> u32 {
        let total = self.state.result.as_ref().map_or(0, |r| r.total_count);
        pagination::total_pages(total, LOCAL_PAGE_SIZE)
    }

    /// Results replace the trending view only while there is something to show.
    pub fn showing_results(&self) -> bool {
        self.state
            .result
            .as_ref()
            .is_some_and(|result| !result.items.is_empty())
    }

    /// Books currently on screen: the result page, or the trending list.
    pub fn visible_books(&self) -> &[BookSummary] {
        match &self.state.result {
            Some(result) if self.showing_results() => &result.items,
            _ => &self.state.trending,
        }
    }

    fn issue_search(&mut self, criteria: SearchCriteria, local_page: u32) -> SearchTicket {
        self.search_seq += 1;
        self.state.status = Status::Loading;
        SearchTicket {
            seq: self.search_seq,
            request: PageRequest {
                criteria,
                local_page,
            },
        }
    }
}
