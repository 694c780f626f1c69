use std::fmt;

/// User-visible status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Waiting,
    Locating,
    Searching,
    Found { total: usize, shown: usize },
    NoResults,
    NetworkError,
    LocationUnavailable,
    LocationUnsupported,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("Waiting for search\u{2026}"),
            Self::Locating => f.write_str("Getting your location\u{2026}"),
            Self::Searching => f.write_str("Searching for hotels nearby\u{2026}"),
            Self::Found { total, shown } => {
                write!(f, "Found {total} places, showing closest {shown}.")
            }
            Self::NoResults => f.write_str("No hotels found nearby. Try a different area."),
            Self::NetworkError => f.write_str("Error contacting map server. Please try again."),
            Self::LocationUnavailable => {
                f.write_str("Location permission denied or unavailable. Please try again.")
            }
            Self::LocationUnsupported => f.write_str("Geolocation not supported on this system."),
        }
    }
}

/// Where a search cycle currently is.
///
/// ```text
/// Idle -> AcquiringLocation -> Searching -> Idle
///               |                  |
///               +------------------+--> Idle (on failure)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AcquiringLocation,
    Searching,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::AcquiringLocation => "acquiring-location",
            Self::Searching => "searching",
        })
    }
}
