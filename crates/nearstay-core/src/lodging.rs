use std::fmt;

use crate::geo::Coordinate;

/// Display name used for lodging without a `name` tag.
pub const UNNAMED: &str = "Unnamed hotel (OpenStreetMap)";

/// How a map feature is represented in the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Node,
    Way,
    Relation,
}

/// A lodging feature with a resolved position.
///
/// Areas (ways and relations) are positioned at their center point.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub kind: FeatureKind,
    pub name: Option<String>,
    pub position: Coordinate,
}

impl Candidate {
    /// The `name` tag, or [`UNNAMED`] when it is missing or blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED)
    }
}

/// A candidate with its distance from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHotel {
    pub candidate: Candidate,
    pub name: String,
    pub distance_km: f64,
}

impl RankedHotel {
    #[must_use]
    pub fn new(candidate: Candidate, user: &Coordinate) -> Self {
        let distance_km = user.distance_km(&candidate.position);
        let name = candidate.display_name().to_owned();
        Self {
            candidate,
            name,
            distance_km,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Coordinate {
        self.candidate.position
    }
}

impl fmt::Display for RankedHotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} km)", self.name, self.distance_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: Option<&str>) -> Candidate {
        Candidate {
            id: 1,
            kind: FeatureKind::Node,
            name: name.map(str::to_owned),
            position: Coordinate::new(0.0, 0.0),
        }
    }

    #[test]
    fn named() {
        assert_eq!(candidate(Some("Grand")).display_name(), "Grand");
    }

    #[test]
    fn missing_name_uses_placeholder() {
        assert_eq!(candidate(None).display_name(), UNNAMED);
    }

    #[test]
    fn blank_name_uses_placeholder() {
        assert_eq!(candidate(Some("  ")).display_name(), UNNAMED);
    }

    #[test]
    fn ranked_display_rounds_to_two_decimals() {
        let hotel = RankedHotel::new(candidate(Some("Grand")), &Coordinate::new(0.0, 1.0));
        assert_eq!(hotel.to_string(), "Grand (111.19 km)");
    }
}
