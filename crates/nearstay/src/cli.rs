use std::path::PathBuf;

use clap::Parser;
use futures_lite::{Stream, StreamExt};

/// Find hotels near you.
///
/// Without --lat/--lon the position comes from the config file or, failing
/// that, an IP address lookup.
#[derive(Debug, Parser)]
#[command(name = "nearstay", version, about, long_about = None)]
pub struct Args {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Search radius in meters
    #[arg(short, long)]
    pub radius: Option<u32>,

    /// How many of the closest hotels to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// `tourism` tag value to search for; repeat for several
    #[arg(short, long)]
    pub kind: Vec<String>,

    /// Overpass API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Never look up the position from the IP address
    #[arg(long)]
    pub no_ip: bool,

    /// Where to write the map page
    #[arg(long, conflicts_with = "no_map")]
    pub map: Option<PathBuf>,

    /// Do not write a map page
    #[arg(long)]
    pub no_map: bool,

    /// Config file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run one search and exit
    #[arg(long)]
    pub once: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search,
    Open(usize),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (None | Some("search" | "s"), None, None) => Self::Search,
            (Some("open" | "o"), Some(n), None) => n
                .parse()
                .map_or_else(|_| Self::Unknown(line.trim().to_owned()), Self::Open),
            (Some("help" | "h" | "?"), None, None) => Self::Help,
            (Some("quit" | "q" | "exit"), None, None) => Self::Quit,
            _ => Self::Unknown(line.trim().to_owned()),
        }
    }
}

/// Drop input that is already waiting, such as lines typed while a search
/// ran. Returns how many items were dropped.
pub async fn discard_ready<S: Stream + Unpin>(input: &mut S) -> usize {
    let mut dropped = 0;
    while let Some(Some(_)) = futures_lite::future::poll_once(input.next()).await {
        dropped += 1;
    }
    dropped
}

pub const HELP: &str = "\
Commands:
  <enter>, search   search for hotels near you
  open N            open result N in the browser
  help              show this help
  quit              exit";
