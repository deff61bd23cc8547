//! Plain-text views over session state.

use std::io::{self, Write};

use serde::Serialize;

use crate::bookmarks::BookmarkStore;
use crate::covers::{CoverSize, Covers, detail_url};
use crate::formats::{BookSummary, SearchResult};
use crate::session::Session;

#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub mode: Option<&'static str>,
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub items: &'a [BookSummary],
}

impl<'a> SearchOutput<'a> {
    pub fn new(session: &'a Session, result: &'a SearchResult) -> Self {
        let state = session.controller.state();
        Self {
            mode: state.active.as_ref().map(|criteria| criteria.mode().as_str()),
            query: state
                .active
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            page: state.page,
            total_pages: session.controller.total_pages(),
            total_count: result.total_count,
            items: &result.items,
        }
    }
}

pub fn book_line(index: usize, book: &BookSummary, bookmarked: bool, covers: &Covers) -> String {
    let mark = if bookmarked { "*" } else { " " };
    format!(
        "{index:>2}. [{mark}] {} | {} | {} | {}",
        book.title,
        book.primary_author,
        book.first_published,
        covers.image_url(book.cover.as_ref(), CoverSize::Medium)
    )
}

pub fn write_books(
    out: &mut impl Write,
    session: &Session,
    books: &[BookSummary],
) -> io::Result<()> {
    for (i, book) in books.iter().enumerate() {
        let bookmarked = session.bookmarks.contains(&book.id);
        writeln!(out, "{}", book_line(i + 1, book, bookmarked, &session.covers))?;
    }
    Ok(())
}

pub fn write_results(out: &mut impl Write, session: &Session) -> io::Result<()> {
    let controller = &session.controller;
    let state = controller.state();
    if let Some(criteria) = &state.active {
        writeln!(out, "Showing results for: {criteria}")?;
    }
    let Some(result) = state.result.as_ref().filter(|r| !r.items.is_empty()) else {
        writeln!(out, "No books found.")?;
        return Ok(());
    };
    writeln!(
        out,
        "Page {} of {} ({} matches)",
        state.page,
        controller.total_pages(),
        result.total_count
    )?;
    write_books(out, session, &result.items)
}

pub fn write_trending(out: &mut impl Write, session: &Session) -> io::Result<()> {
    let state = session.controller.state();
    writeln!(out, "Trending books ({})", state.trending_period)?;
    if state.trending.is_empty() {
        writeln!(out, "Nothing trending right now.")?;
        return Ok(());
    }
    write_books(out, session, &state.trending)
}

pub fn write_detail(out: &mut impl Write, session: &Session, book: &BookSummary) -> io::Result<()> {
    let authors = if book.authors.is_empty() {
        "Unknown".to_owned()
    } else {
        book.authors.join(", ")
    };
    let languages = if book.languages.is_empty() {
        "N/A".to_owned()
    } else {
        book.languages.join(", ")
    };
    let bookmarked = if session.bookmarks.contains(&book.id) {
        "yes"
    } else {
        "no"
    };

    writeln!(out, "{}", book.title)?;
    writeln!(out, "  Authors:         {authors}")?;
    writeln!(out, "  First published: {}", book.first_published)?;
    writeln!(out, "  Languages:       {languages}")?;
    writeln!(
        out,
        "  Cover:           {}",
        session.covers.image_url(book.cover.as_ref(), CoverSize::Large)
    )?;
    writeln!(
        out,
        "  Open Library:    {}",
        detail_url(&session.config.catalog_url, &book.id)
    )?;
    writeln!(out, "  Bookmarked:      {bookmarked}")
}

pub fn write_bookmarks(
    out: &mut impl Write,
    store: &BookmarkStore,
    covers: &Covers,
    catalog_url: &str,
) -> io::Result<()> {
    writeln!(out, "Bookmarks ({})", store.len())?;
    if store.is_empty() {
        writeln!(out, "No bookmarks added yet.")?;
        return Ok(());
    }
    for entry in store.entries() {
        writeln!(
            out,
            "- {} | {} \u{2022} {} | {} | {}",
            entry.title,
            entry.author,
            entry.year,
            detail_url(catalog_url, &entry.id),
            covers.image_url(entry.cover.as_ref(), CoverSize::Small)
        )?;
    }
    Ok(())
}
