pub mod terminal;

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use nearstay_core::{Coordinate, Ranking, Status};

use crate::map::MapPresenter;

/// One line of the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub distance_km: f64,
    pub url: String,
}

/// Map search page for a single coordinate.
#[must_use]
pub fn search_url(position: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        position.lat, position.lon
    )
}

/// Where the status line and result list are shown.
pub trait Console: Send + Sync {
    fn status(&self, status: &Status);

    /// Replace the shown list with `rows`. An empty slice clears it.
    fn list(&self, rows: &[Row]);
}

/// Keeps the result list and the map markers in step.
pub struct Renderer<C> {
    console: C,
    rows: Vec<Row>,
}

impl<C: Console> Renderer<C> {
    pub const fn new(console: C) -> Self {
        Self {
            console,
            rows: Vec::new(),
        }
    }

    pub fn status(&self, status: &Status) {
        self.console.status(status);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row shown at 1-based `index`.
    pub fn row(&self, index: usize) -> Option<&Row> {
        index.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Rebuild the list and the map markers from `ranking`.
    pub fn render(&mut self, ranking: &Ranking, map: &mut MapPresenter) {
        if ranking.is_empty() {
            self.clear(map);
            self.console.status(&Status::NoResults);
            return;
        }
        self.rows = ranking
            .hotels
            .iter()
            .map(|h| Row {
                name: h.name.clone(),
                distance_km: h.distance_km,
                url: search_url(h.position()),
            })
            .collect();
        self.console.list(&self.rows);
        map.plot_results(&ranking.hotels);
    }

    /// Empty both the list and the map markers.
    pub fn clear(&mut self, map: &mut MapPresenter) {
        self.rows.clear();
        self.console.list(&[]);
        map.clear_results();
    }
}

/// Open `url` in the system browser.
///
/// The launcher process is waited on by the returned thread, which may be
/// dropped to let that happen in the background.
pub fn open_url(url: &str) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    command.arg(url);
    launch(command)
}

fn launch(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(std::thread::spawn(move || child.wait()))
}
