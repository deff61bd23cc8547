use std::io::Write;

use anyhow::Context as _;

use crate::bookmarks::Toggled;
use crate::cli::{BookmarksCommand, SearchArgs, TrendingArgs};
use crate::controller::Applied;
use crate::criteria::{InputField, SearchMode};
use crate::render::{self, SearchOutput};
use crate::session::Session;

pub async fn search(
    session: &mut Session,
    args: SearchArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let controller = &mut session.controller;
    controller.change_mode(args.by);
    match args.by {
        SearchMode::Title | SearchMode::Author => {
            controller.set_input(InputField::Term, args.term.unwrap_or_default());
        }
        SearchMode::Year => {
            controller.set_input(InputField::Term, args.term.or(args.year).unwrap_or_default());
        }
        SearchMode::All => {
            controller.set_input(InputField::Title, args.title.unwrap_or_default());
            controller.set_input(InputField::Author, args.author.unwrap_or_default());
            controller.set_input(InputField::Year, args.year.unwrap_or_default());
        }
    }

    controller
        .search_page(args.page.max(1))
        .await
        .context("search catalog")?;

    if let Some(index) = args.bookmark {
        let (toggled, book) = session.toggle_visible(index)?;
        if !args.json {
            writeln!(out, "{}", toggle_message(toggled, &book.title))?;
        }
    }

    if args.json {
        let result = session.controller.state().result.clone().unwrap_or_default();
        serde_json::to_writer_pretty(&mut *out, &SearchOutput::new(session, &result))
            .context("write search json")?;
        writeln!(out)?;
    } else {
        render::write_results(out, session)?;
    }
    Ok(())
}

pub async fn trending(
    session: &mut Session,
    args: TrendingArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if let Applied::Failed(err) = session.controller.load_trending(args.period).await {
        return Err(err).context("load trending books");
    }

    if let Some(index) = args.bookmark {
        let (toggled, book) = session.toggle_visible(index)?;
        if !args.json {
            writeln!(out, "{}", toggle_message(toggled, &book.title))?;
        }
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &session.controller.state().trending)
            .context("write trending json")?;
        writeln!(out)?;
    } else {
        render::write_trending(out, session)?;
    }
    Ok(())
}

pub fn bookmarks(
    session: &mut Session,
    command: BookmarksCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        BookmarksCommand::List { json: true } => {
            let entries = session.bookmarks.entries().collect::<Vec<_>>();
            serde_json::to_writer_pretty(&mut *out, &entries).context("write bookmarks json")?;
            writeln!(out)?;
        }
        BookmarksCommand::List { json: false } => {
            render::write_bookmarks(
                out,
                &session.bookmarks,
                &session.covers,
                &session.config.catalog_url,
            )?;
        }
        BookmarksCommand::Remove { id } => {
            let Some(entry) = session.bookmarks.remove(&id) else {
                anyhow::bail!("no bookmark with id {id}");
            };
            writeln!(out, "{}", toggle_message(Toggled::Removed, &entry.title))?;
        }
        BookmarksCommand::Clear => {
            let count = session.bookmarks.len();
            session.bookmarks.clear();
            writeln!(out, "Removed {count} bookmark(s).")?;
        }
    }
    Ok(())
}

pub fn toggle_message(toggled: Toggled, title: &str) -> String {
    match toggled {
        Toggled::Added => format!("Bookmarked: {title}"),
        Toggled::Removed => format!("Removed bookmark: {title}"),
    }
}
