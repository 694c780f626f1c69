//! Domain types for finding lodging near a point: coordinates, great-circle
//! distance, lodging candidates, distance ranking and search status.
//!
//! Nothing in this crate performs I/O.

pub mod geo;
pub mod lodging;
pub mod rank;
pub mod status;

pub use geo::Coordinate;
pub use lodging::{Candidate, FeatureKind, RankedHotel};
pub use rank::{rank, Ranking};
pub use status::{Phase, Status};
