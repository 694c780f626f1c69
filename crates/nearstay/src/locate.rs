pub mod fixed;
pub mod ip;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use nearstay_core::Coordinate;

/// How long a position fix may take before it counts as timed out.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Options for a single position request.
#[derive(Debug, Clone, Copy)]
pub struct LocateOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Why no position was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// No way to determine a position is configured.
    Unsupported,
    /// The provider refused to disclose a position.
    PermissionDenied(String),
    TimedOut,
    Unavailable(String),
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => f.write_str("geolocation not supported"),
            Self::PermissionDenied(msg) => write!(f, "permission denied: {msg}"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Unavailable(msg) => write!(f, "position unavailable: {msg}"),
        }
    }
}

impl std::error::Error for LocationError {}

/// A one-shot source of the user's position.
pub trait Locator: Send + Sync {
    fn locate(
        &self,
        options: LocateOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, LocationError>> + Send + '_>>;
}

/// Locator for systems with no position source.
pub struct Unsupported;

impl Locator for Unsupported {
    fn locate(
        &self,
        _options: LocateOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, LocationError>> + Send + '_>> {
        Box::pin(async { Err(LocationError::Unsupported) })
    }
}

/// Run `locator` with the request bounded by `options.timeout`.
pub async fn acquire(
    locator: &dyn Locator,
    options: LocateOptions,
) -> Result<Coordinate, LocationError> {
    futures_lite::future::or(locator.locate(options), async {
        async_io::Timer::after(options.timeout).await;
        Err(LocationError::TimedOut)
    })
    .await
}
