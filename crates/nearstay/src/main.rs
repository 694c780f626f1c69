mod cli;
mod config;
mod finder;
mod http;
mod locate;
mod map;
mod render;
mod search;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use futures_lite::io::AsyncBufReadExt;
use futures_lite::StreamExt;
use is_terminal::IsTerminal;
use macro_rules_attribute::apply;
use nearstay_core::Status;
use smol_macros::main;

use crate::cli::{Args, Command};
use crate::config::Settings;
use crate::locate::{LocateOptions, Locator};
use crate::map::MapPresenter;
use crate::render::{Console, Renderer};
use crate::search::{Outcome, Params, Session};

#[apply(main!)]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "debug,isahc=error,polling=warn,async_io=warn"
    } else {
        "info,isahc=error"
    };
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::load(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("nearstay: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match http::Client::new(settings.user_agent.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("nearstay: {e}");
            return ExitCode::FAILURE;
        }
    };

    let interactive = !args.once && std::io::stdin().is_terminal();
    let console = render::terminal::Console::new(std::io::stdout().is_terminal(), interactive);
    let mut session = Session::new(
        locator(&settings, client.clone()),
        Box::new(finder::overpass::Backend::new(
            client,
            settings.endpoint.clone(),
            settings.kinds.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )),
        Renderer::new(console),
        MapPresenter::new(settings.map_path.clone()),
        Params {
            locate: LocateOptions::default(),
            radius_m: settings.radius_m,
            limit: settings.limit,
        },
    );

    if interactive {
        run_interactive(&mut session).await;
        ExitCode::SUCCESS
    } else {
        let outcome = session.search().await;
        announce_map(&session);
        exit_code(&outcome)
    }
}

/// Pick the position source: a fixed position, then IP lookup.
fn locator(settings: &Settings, client: http::Client) -> Box<dyn Locator> {
    if let Some(position) = settings.location {
        tracing::debug!(%position, "using fixed position");
        Box::new(locate::fixed::Locator::new(position))
    } else if settings.ip_lookup {
        tracing::debug!("using IP lookup for position");
        Box::new(locate::ip::Locator::new(client))
    } else {
        Box::new(locate::Unsupported)
    }
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    match outcome {
        Outcome::Rendered { .. } | Outcome::NoResults => ExitCode::SUCCESS,
        Outcome::LocationError(_) => ExitCode::from(2),
        Outcome::NetworkError(_) => ExitCode::from(3),
    }
}

fn announce_map<C: Console>(session: &Session<C>) {
    let (Some(_), Some(path)) = (session.map().state(), session.map().output()) else {
        return;
    };
    println!("Map: {}", path.display());
}

/// Read commands from stdin until it closes or the user quits.
///
/// A search runs to completion before the next line is read, so no two
/// searches overlap. Lines typed while it ran are dropped.
async fn run_interactive<C: Console>(session: &mut Session<C>) {
    session.renderer().status(&Status::Waiting);
    println!("{}", cli::HELP);

    let stdin = blocking::Unblock::new(std::io::stdin());
    let mut lines = futures_lite::io::BufReader::new(stdin).lines();

    while let Some(line) = lines.next().await {
        let Ok(line) = line else { break };
        match Command::parse(&line) {
            Command::Search => {
                session.search().await;
                let skipped = cli::discard_ready(&mut lines).await;
                if skipped > 0 {
                    tracing::debug!(skipped, "ignored input typed during search");
                }
                announce_map(session);
                tracing::debug!(phase = %session.phase(), "ready for next search");
            }
            Command::Open(n) => match session.renderer().row(n) {
                Some(row) => {
                    if let Err(e) = render::open_url(&row.url) {
                        tracing::warn!(%e, url = %row.url, "failed to open browser");
                        println!("Could not open a browser. Visit {}", row.url);
                    }
                }
                None => println!("No result {n}."),
            },
            Command::Help => println!("{}", cli::HELP),
            Command::Quit => break,
            Command::Unknown(input) => println!("Unknown command {input:?}. Type help."),
        }
    }
}
