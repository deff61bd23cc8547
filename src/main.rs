use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use bookfinder::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep the interactive shell quiet unless asked otherwise.
    let default_directive = match cli.command {
        Command::Browse => "warn",
        _ => "info",
    };
    bookfinder::logging::init(default_directive).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let config = bookfinder::config::Config::from_env()
        .context("load config")?
        .with_overrides(&cli.global);
    let mut session = bookfinder::session::Session::open(config).context("open session")?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Search(args) => {
            bookfinder::commands::search(&mut session, args, &mut out)
                .await
                .context("search")?;
        }
        Command::Trending(args) => {
            bookfinder::commands::trending(&mut session, args, &mut out)
                .await
                .context("trending")?;
        }
        Command::Bookmarks { command } => {
            bookfinder::commands::bookmarks(&mut session, command, &mut out)
                .context("bookmarks")?;
        }
        Command::Browse => {
            drop(out);
            bookfinder::browse::run(&mut session).await.context("browse")?;
        }
    }

    Ok(())
}
