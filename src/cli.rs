use clap::{Args, Parser, Subcommand};

use crate::catalog::TrendingPeriod;
use crate::criteria::SearchMode;

#[derive(Debug, Parser)]
#[command(author, version, about = "Search a public book catalog and keep bookmarks")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Catalog service base URL (default: $BOOKFINDER_CATALOG_URL or Open Library).
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// Cover image service base URL (default: $BOOKFINDER_COVERS_URL).
    #[arg(long, global = true)]
    pub covers_url: Option<String>,

    /// Local storage file holding bookmarks (default: $BOOKFINDER_BOOKMARKS_FILE).
    #[arg(long, global = true)]
    pub bookmarks_file: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog and print one page of results.
    Search(SearchArgs),
    /// Show trending works.
    Trending(TrendingArgs),
    Bookmarks {
        #[command(subcommand)]
        command: BookmarksCommand,
    },
    /// Interactive shell.
    Browse,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// What to search by.
    #[arg(long, value_enum, default_value_t = SearchMode::Title)]
    pub by: SearchMode,

    /// Search term for `title`, `author` and `year`.
    #[arg(long)]
    pub term: Option<String>,

    /// Title (for `--by all`).
    #[arg(long)]
    pub title: Option<String>,

    /// Author (for `--by all`).
    #[arg(long)]
    pub author: Option<String>,

    /// First publication year (for `--by all`, or instead of `--term` with `--by year`).
    #[arg(long)]
    pub year: Option<String>,

    /// Local page number (10 results per page).
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Toggle the bookmark of the N-th result on the printed page.
    #[arg(long)]
    pub bookmark: Option<usize>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TrendingArgs {
    #[arg(long, value_enum, default_value_t = TrendingPeriod::Daily)]
    pub period: TrendingPeriod,

    /// Toggle the bookmark of the N-th trending work.
    #[arg(long)]
    pub bookmark: Option<usize>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum BookmarksCommand {
    /// List saved bookmarks.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Remove a bookmark by catalog id (e.g. `/works/OL45804W`).
    Remove { id: String },
    /// Remove every bookmark.
    Clear,
}
