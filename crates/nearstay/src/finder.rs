pub mod overpass;

use std::future::Future;
use std::pin::Pin;

use nearstay_core::{Candidate, Coordinate};

/// Search radius used when none is configured.
pub const DEFAULT_RADIUS_M: u32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// Transport failure or a non-success HTTP status.
    Network(String),
}

impl std::fmt::Display for FinderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {msg}"),
        }
    }
}

impl std::error::Error for FinderError {}

/// A source of lodging near a point.
pub trait Finder: Send + Sync {
    /// Find lodging within `radius_m` meters of `center`.
    ///
    /// An unreadable response yields no candidates rather than an error.
    fn search(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, FinderError>> + Send + '_>>;
}
