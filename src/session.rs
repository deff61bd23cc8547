use std::sync::Arc;

use anyhow::Context as _;

use crate::bookmarks::{BookmarkStore, Toggled};
use crate::catalog::{CatalogClient, HttpTransport, Transport};
use crate::config::Config;
use crate::controller::QueryController;
use crate::covers::Covers;
use crate::formats::BookSummary;
use crate::storage::LocalStorage;

/// Everything one run of the program works with.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub controller: QueryController,
    pub bookmarks: BookmarkStore,
    pub covers: Covers,
}

impl Session {
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config.http_timeout).context("build transport")?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let client = CatalogClient::new(&config.catalog_url, transport)?;
        let bookmarks = BookmarkStore::load(LocalStorage::new(&config.bookmarks_file));
        let covers = Covers::new(&config.covers_url);
        Ok(Self {
            controller: QueryController::new(client),
            bookmarks,
            covers,
            config,
        })
    }

    /// 1-based lookup into the books currently on screen.
    pub fn visible_book(&self, index: usize) -> anyhow::Result<&BookSummary> {
        let books = self.controller.visible_books();
        index
            .checked_sub(1)
            .and_then(|i| books.get(i))
            .ok_or_else(|| anyhow::anyhow!("no book #{index} (showing {})", books.len()))
    }

    pub fn toggle_visible(&mut self, index: usize) -> anyhow::Result<(Toggled, BookSummary)> {
        let book = self.visible_book(index)?.clone();
        let toggled = self.bookmarks.toggle(&book);
        Ok((toggled, book))
    }
}
