use nearstay_core::{rank, Phase, Status};

use crate::finder::{Finder, FinderError};
use crate::locate::{self, LocateOptions, LocationError, Locator};
use crate::map::MapPresenter;
use crate::render::{Console, Renderer};

/// Parameters applied to every search.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub locate: LocateOptions,
    pub radius_m: u32,
    pub limit: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            locate: LocateOptions::default(),
            radius_m: crate::finder::DEFAULT_RADIUS_M,
            limit: nearstay_core::rank::DEFAULT_LIMIT,
        }
    }
}

/// How a search cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rendered { total: usize, shown: usize },
    NoResults,
    LocationError(LocationError),
    NetworkError(FinderError),
}

/// Runs search cycles: locate, query, rank, render.
///
/// Holds the map for the lifetime of the program. Only one cycle runs at a
/// time since [`Session::search`] borrows the session mutably.
pub struct Session<C> {
    locator: Box<dyn Locator>,
    finder: Box<dyn Finder>,
    renderer: Renderer<C>,
    map: MapPresenter,
    params: Params,
    phase: Phase,
}

impl<C: Console> Session<C> {
    pub fn new(
        locator: Box<dyn Locator>,
        finder: Box<dyn Finder>,
        renderer: Renderer<C>,
        map: MapPresenter,
        params: Params,
    ) -> Self {
        Self {
            locator,
            finder,
            renderer,
            map,
            params,
            phase: Phase::Idle,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn renderer(&self) -> &Renderer<C> {
        &self.renderer
    }

    pub const fn map(&self) -> &MapPresenter {
        &self.map
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = %self.phase, to = %phase, "phase");
        self.phase = phase;
    }

    /// Run one full search cycle and return to [`Phase::Idle`].
    pub async fn search(&mut self) -> Outcome {
        let outcome = self.run().await;
        self.enter(Phase::Idle);
        match &outcome {
            Outcome::Rendered { total, shown } => {
                tracing::info!(total, shown, "search complete");
            }
            Outcome::NoResults => tracing::info!("no results"),
            Outcome::LocationError(e) => tracing::warn!(%e, "location failed"),
            Outcome::NetworkError(e) => tracing::warn!(%e, "search failed"),
        }
        outcome
    }

    async fn run(&mut self) -> Outcome {
        self.enter(Phase::AcquiringLocation);
        self.renderer.status(&Status::Locating);

        let position = match locate::acquire(self.locator.as_ref(), self.params.locate).await {
            Ok(p) => p,
            Err(e) => {
                self.renderer.clear(&mut self.map);
                self.renderer.status(&match e {
                    LocationError::Unsupported => Status::LocationUnsupported,
                    _ => Status::LocationUnavailable,
                });
                return Outcome::LocationError(e);
            }
        };
        tracing::info!(lat = position.lat, lon = position.lon, "located");

        self.map.init_or_recenter(position);
        self.enter(Phase::Searching);
        self.renderer.status(&Status::Searching);

        let candidates = match self.finder.search(position, self.params.radius_m).await {
            Ok(c) => c,
            Err(e) => {
                self.renderer.clear(&mut self.map);
                self.renderer.status(&Status::NetworkError);
                return Outcome::NetworkError(e);
            }
        };

        let ranking = rank(position, candidates, self.params.limit);
        self.renderer.render(&ranking, &mut self.map);
        if ranking.is_empty() {
            return Outcome::NoResults;
        }
        self.renderer.status(&Status::Found {
            total: ranking.total,
            shown: ranking.shown(),
        });
        Outcome::Rendered {
            total: ranking.total,
            shown: ranking.shown(),
        }
    }
}
