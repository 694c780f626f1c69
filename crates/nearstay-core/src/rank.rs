use crate::geo::Coordinate;
use crate::lodging::{Candidate, RankedHotel};

/// How many hotels a search shows.
pub const DEFAULT_LIMIT: usize = 6;

/// Hotels sorted by distance, capped, with the count before capping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub hotels: Vec<RankedHotel>,
    pub total: usize,
}

impl Ranking {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }

    #[must_use]
    pub fn shown(&self) -> usize {
        self.hotels.len()
    }
}

/// Rank `candidates` by great-circle distance from `user`, nearest first.
///
/// Equal distances keep their input order. At most `limit` hotels are kept.
#[must_use]
pub fn rank(user: Coordinate, candidates: Vec<Candidate>, limit: usize) -> Ranking {
    let total = candidates.len();
    let mut hotels: Vec<RankedHotel> = candidates
        .into_iter()
        .map(|c| RankedHotel::new(c, &user))
        .collect();
    hotels.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hotels.truncate(limit);
    Ranking { hotels, total }
}
