use std::io::Write;
use std::str::FromStr;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use crate::catalog::TrendingPeriod;
use crate::commands::toggle_message;
use crate::controller::Applied;
use crate::criteria::{InputField, SearchMode};
use crate::render;
use crate::session::Session;

const HELP: &str = "\
commands:
  mode <title|author|year|all>   switch search form (clears the current search)
  set <term|title|author|year> <text>
  find [text]                    submit the search form
  next | prev | page <n>         move through results
  retry                          fetch the current page again
  trending [daily|weekly|monthly]
  star <n>                       toggle bookmark of the n-th book shown
  show <n>                       details of the n-th book shown
  bookmarks                      list bookmarks
  unstar <id>                    remove a bookmark by id
  back                           back to trending
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Mode(SearchMode),
    Set(InputField, String),
    Find(Option<String>),
    Next,
    Prev,
    Page(u32),
    Retry,
    Trending(Option<TrendingPeriod>),
    Star(usize),
    Unstar(String),
    Show(usize),
    Bookmarks,
    Back,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let rest_opt = (!rest.is_empty()).then(|| rest.to_owned());
        let index = |what: &str| {
            rest.parse::<usize>()
                .map_err(|_| format!("usage: {what} <n>"))
        };

        match word.to_ascii_lowercase().as_str() {
            "mode" => rest
                .parse()
                .map(ShellCommand::Mode)
                .map_err(|_| "usage: mode <title|author|year|all>".to_owned()),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let field = field
                    .parse()
                    .map_err(|_| "usage: set <term|title|author|year> <text>".to_owned())?;
                Ok(ShellCommand::Set(field, value.trim().to_owned()))
            }
            "find" | "search" => Ok(ShellCommand::Find(rest_opt)),
            "next" | "n" => Ok(ShellCommand::Next),
            "prev" | "p" => Ok(ShellCommand::Prev),
            "page" => rest
                .parse()
                .map(ShellCommand::Page)
                .map_err(|_| "usage: page <n>".to_owned()),
            "retry" | "r" => Ok(ShellCommand::Retry),
            "trending" => match rest_opt {
                None => Ok(ShellCommand::Trending(None)),
                Some(period) => period
                    .parse()
                    .map(|p| ShellCommand::Trending(Some(p)))
                    .map_err(|_| "usage: trending [daily|weekly|monthly]".to_owned()),
            },
            "star" => index("star").map(ShellCommand::Star),
            "show" => index("show").map(ShellCommand::Show),
            "unstar" => rest_opt
                .map(ShellCommand::Unstar)
                .ok_or_else(|| "usage: unstar <id>".to_owned()),
            "bookmarks" => Ok(ShellCommand::Bookmarks),
            "back" => Ok(ShellCommand::Back),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command: {other} (try `help`)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn run(session: &mut Session) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    let period = session.controller.state().trending_period;
    handle(session, ShellCommand::Trending(Some(period)), &mut out).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(out, "[{}] > ", session.controller.state().mode)?;
        out.flush()?;
        let Some(line) = lines.next_line().await.context("read stdin")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "! {message}")?;
                continue;
            }
        };
        if handle(session, command, &mut out).await? == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Applies one command. Catalog and input problems are reported to `out`, never returned.
pub async fn handle(
    session: &mut Session,
    command: ShellCommand,
    out: &mut impl Write,
) -> anyhow::Result<Flow> {
    match command {
        ShellCommand::Mode(mode) => {
            session.controller.change_mode(mode);
            writeln!(out, "search by {mode}")?;
        }
        ShellCommand::Set(field, value) => {
            session.controller.set_input(field, value);
        }
        ShellCommand::Find(text) => {
            if let Some(text) = text {
                if session.controller.state().mode == SearchMode::All {
                    writeln!(out, "! use `set title|author|year <text>` then `find`")?;
                    return Ok(Flow::Continue);
                }
                session.controller.set_input(InputField::Term, text);
            }
            match session.controller.search().await {
                Ok(applied) => report(session, applied, out)?,
                Err(err) => writeln!(out, "! {err}")?,
            }
        }
        ShellCommand::Next => {
            let applied = session.controller.next_page();
            page_moved(session, applied, out).await?;
        }
        ShellCommand::Prev => {
            let applied = session.controller.prev_page();
            page_moved(session, applied, out).await?;
        }
        ShellCommand::Page(page) => {
            let applied = session.controller.change_page(page);
            page_moved(session, applied, out).await?;
        }
        ShellCommand::Retry => {
            let applied = session.controller.refresh();
            page_moved(session, applied, out).await?;
        }
        ShellCommand::Trending(period) => {
            let period = period.unwrap_or(session.controller.state().trending_period);
            match session.controller.load_trending(period).await {
                Applied::Failed(err) => {
                    writeln!(out, "! failed to load trending books: {err}")?;
                }
                _ => render::write_trending(out, session)?,
            }
        }
        ShellCommand::Star(index) => match session.toggle_visible(index) {
            Ok((toggled, book)) => writeln!(out, "{}", toggle_message(toggled, &book.title))?,
            Err(err) => writeln!(out, "! {err}")?,
        },
        ShellCommand::Unstar(id) => match session.bookmarks.remove(&id) {
            Some(entry) => writeln!(
                out,
                "{}",
                toggle_message(crate::bookmarks::Toggled::Removed, &entry.title)
            )?,
            None => writeln!(out, "! no bookmark with id {id}")?,
        },
        ShellCommand::Show(index) => match session.visible_book(index) {
            Ok(book) => render::write_detail(out, session, book)?,
            Err(err) => writeln!(out, "! {err}")?,
        },
        ShellCommand::Bookmarks => {
            render::write_bookmarks(
                out,
                &session.bookmarks,
                &session.covers,
                &session.config.catalog_url,
            )?;
        }
        ShellCommand::Back => {
            session.controller.reset();
            render::write_trending(out, session)?;
        }
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn page_moved(
    session: &mut Session,
    ticket: Option<crate::controller::SearchTicket>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(ticket) = ticket else {
        writeln!(out, "! no other page to show")?;
        return Ok(());
    };
    let completion = ticket.run(session.controller.client()).await;
    let applied = session.controller.apply_search(completion);
    report(session, applied, out)
}

fn report(session: &Session, applied: Applied, out: &mut impl Write) -> anyhow::Result<()> {
    match applied {
        Applied::Updated => render::write_results(out, session)?,
        Applied::Discarded => {}
        Applied::Failed(err) => {
            writeln!(out, "! something went wrong while fetching books: {err}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::catalog::tests::FakeTransport;
    use crate::config::Config;

    #[test]
    fn parse_commands() {
        assert_eq!(
            "mode year".parse::<ShellCommand>(),
            Ok(ShellCommand::Mode(SearchMode::Year))
        );
        assert_eq!(
            "set author  Ursula Le Guin ".parse::<ShellCommand>(),
            Ok(ShellCommand::Set(InputField::Author, "Ursula Le Guin".to_owned()))
        );
        assert_eq!(
            "find the left hand".parse::<ShellCommand>(),
            Ok(ShellCommand::Find(Some("the left hand".to_owned())))
        );
        assert_eq!("find".parse::<ShellCommand>(), Ok(ShellCommand::Find(None)));
        assert_eq!("page 4".parse::<ShellCommand>(), Ok(ShellCommand::Page(4)));
        assert_eq!(
            "trending weekly".parse::<ShellCommand>(),
            Ok(ShellCommand::Trending(Some(TrendingPeriod::Weekly)))
        );
        assert_eq!("star 2".parse::<ShellCommand>(), Ok(ShellCommand::Star(2)));
        assert_eq!("retry".parse::<ShellCommand>(), Ok(ShellCommand::Retry));
        assert_eq!("QUIT".parse::<ShellCommand>(), Ok(ShellCommand::Quit));
    }

    #[test]
    fn parse_errors_carry_usage() {
        assert!("star".parse::<ShellCommand>().unwrap_err().contains("usage: star"));
        assert!("mode isbn".parse::<ShellCommand>().is_err());
        assert!("frobnicate".parse::<ShellCommand>().unwrap_err().contains("unknown command"));
    }

    fn session(fake: Arc<FakeTransport>, dir: &std::path::Path) -> Session {
        let config = Config {
            catalog_url: "https://catalog.test".to_owned(),
            covers_url: "https://covers.test".to_owned(),
            bookmarks_file: dir.join("storage.json"),
            http_timeout: Duration::from_secs(1),
        };
        Session::with_transport(config, fake).unwrap()
    }

    async fn exec(session: &mut Session, line: &str) -> String {
        let mut out = Vec::new();
        let command = line.parse::<ShellCommand>().unwrap();
        handle(session, command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn find_star_and_show() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let fake = Arc::new(FakeTransport::with(
            "/search.json?author=le+guin&page=1",
            serde_json::json!({
                "numFound": 1,
                "docs": [{
                    "key": "/works/OL59W",
                    "title": "The Left Hand of Darkness",
                    "author_name": ["Ursula K. Le Guin"],
                    "first_publish_year": 1969,
                    "cover_i": 99,
                    "language": ["eng", "spa"]
                }]
            }),
        ));
        let mut session = session(fake, temp.path());

        exec(&mut session, "mode author").await;
        let shown = exec(&mut session, "find le guin").await;
        assert!(shown.contains("Showing results for: le guin"));
        assert!(shown.contains("Page 1 of 1 (1 matches)"));
        assert!(shown.contains(" 1. [ ] The Left Hand of Darkness | Ursula K. Le Guin | 1969"));

        let starred = exec(&mut session, "star 1").await;
        assert_eq!(starred.trim(), "Bookmarked: The Left Hand of Darkness");
        assert!(session.bookmarks.contains("/works/OL59W"));

        let detail = exec(&mut session, "show 1").await;
        assert!(detail.contains("Languages:       eng, spa"));
        assert!(detail.contains("https://covers.test/b/id/99-L.jpg"));
        assert!(detail.contains("https://catalog.test/works/OL59W"));
        assert!(detail.contains("Bookmarked:      yes"));

        let listed = exec(&mut session, "bookmarks").await;
        assert!(listed.contains("Bookmarks (1)"));
        assert!(listed.contains("https://covers.test/b/id/99-S.jpg"));
        Ok(())
    }

    #[tokio::test]
    async fn notices_do_not_end_the_session() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let fake = Arc::new(FakeTransport::default());
        let mut session = session(Arc::clone(&fake), temp.path());

        let shown = exec(&mut session, "next").await;
        assert!(shown.starts_with("! no other page"));

        let shown = exec(&mut session, "find").await;
        assert!(shown.starts_with("! invalid input"));

        let shown = exec(&mut session, "find dune").await;
        assert!(shown.starts_with("! something went wrong"));

        let shown = exec(&mut session, "trending").await;
        assert!(shown.starts_with("! failed to load trending books"));

        let shown = exec(&mut session, "star 4").await;
        assert!(shown.starts_with("! no book #4"));
        assert_eq!(fake.request_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failed_page_can_be_fetched_again() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let docs = (0..100)
            .map(|n| {
                serde_json::json!({
                    "key": format!("/works/OL{n}W"),
                    "title": format!("Book {n}"),
                })
            })
            .collect::<Vec<_>>();
        let fake = Arc::new(FakeTransport::with(
            "/search.json?title=dune&page=1",
            serde_json::json!({ "numFound": 300, "docs": docs }),
        ));
        let mut session = session(Arc::clone(&fake), temp.path());

        exec(&mut session, "find dune").await;
        let shown = exec(&mut session, "page 11").await;
        assert!(shown.starts_with("! something went wrong"));
        assert_eq!(session.controller.state().page, 11);

        let later = (100..200)
            .map(|n| {
                serde_json::json!({
                    "key": format!("/works/OL{n}W"),
                    "title": format!("Book {n}"),
                })
            })
            .collect::<Vec<_>>();
        fake.insert(
            "/search.json?title=dune&page=2",
            serde_json::json!({ "numFound": 300, "docs": later }),
        );

        let shown = exec(&mut session, "page 11").await;
        assert!(shown.contains("Page 11 of 30 (300 matches)"));
        assert!(shown.contains(" 1. [ ] Book 100 |"));

        let shown = exec(&mut session, "retry").await;
        assert!(shown.contains("Page 11 of 30"));
        assert_eq!(fake.request_count(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn back_returns_to_trending() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let fake = Arc::new(FakeTransport::with(
            "/trending/daily.json",
            serde_json::json!({ "works": [{ "key": "/works/OL1W", "title": "Trending One" }] }),
        ));
        let mut session = session(fake, temp.path());

        exec(&mut session, "mode all").await;
        let shown = exec(&mut session, "back").await;
        assert_eq!(session.controller.state().mode, SearchMode::Title);
        assert!(shown.contains("Trending books (daily)"));

        let shown = exec(&mut session, "trending").await;
        assert!(shown.contains(" 1. [ ] Trending One | Unknown Author | N/A"));
        Ok(())
    }
}
