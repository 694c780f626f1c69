use std::future::Future;
use std::pin::Pin;

use nearstay_core::Coordinate;

use super::{LocateOptions, LocationError};
use crate::http::{Fetch, FetchError};

const URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Approximate position from the public IP address, via ip-api.com.
///
/// IP lookup is city-level at best, so `high_accuracy` cannot be honored.
pub struct Locator<F> {
    fetch: F,
}

impl<F: Fetch> Locator<F> {
    pub const fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[derive(serde::Deserialize)]
struct Lookup {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl<F: Fetch> super::Locator for Locator<F> {
    fn locate(
        &self,
        options: LocateOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, LocationError>> + Send + '_>> {
        Box::pin(async move {
            if options.high_accuracy {
                tracing::debug!("high accuracy requested, IP lookup is approximate");
            }
            let response = self
                .fetch
                .get(URL, options.timeout)
                .await
                .map_err(|e| match e {
                    FetchError::Timeout => LocationError::TimedOut,
                    FetchError::Transport(msg) => LocationError::Unavailable(msg),
                })?;

            if !response.is_success() {
                return Err(LocationError::Unavailable(format!(
                    "ip-api.com returned status {}",
                    response.status
                )));
            }

            parse(&response.body)
        })
    }
}

fn parse(body: &str) -> Result<Coordinate, LocationError> {
    let lookup: Lookup = serde_json::from_str(body)
        .map_err(|e| LocationError::Unavailable(format!("failed to parse lookup: {e}")))?;

    if lookup.status != "success" {
        return Err(LocationError::PermissionDenied(
            lookup.message.unwrap_or_else(|| lookup.status.clone()),
        ));
    }

    match (lookup.lat, lookup.lon) {
        (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
        _ => Err(LocationError::Unavailable("lookup has no coordinates".into())),
    }
}

#[cfg(test)]
mod tests {
    use futures_lite::future::block_on;

    use super::*;
    use crate::http::testing::Canned;
    use crate::locate::Locator as _;

    #[test]
    fn success() {
        let fetch = Canned::default().reply(200, r#"{"status":"success","lat":59.9,"lon":10.7}"#);
        let locator = Locator::new(fetch.clone());
        let fix = block_on(locator.locate(LocateOptions::default()));
        assert_eq!(fix, Ok(Coordinate::new(59.9, 10.7)));
        assert_eq!(fetch.requests.lock().unwrap()[0], URL);
    }

    #[test]
    fn refused_lookup_is_permission_denied() {
        let fetch =
            Canned::default().reply(200, r#"{"status":"fail","message":"private range"}"#);
        let fix = block_on(Locator::new(fetch).locate(LocateOptions::default()));
        assert_eq!(
            fix,
            Err(LocationError::PermissionDenied("private range".into()))
        );
    }

    #[test]
    fn timeout() {
        let fetch = Canned::default().fail(FetchError::Timeout);
        let fix = block_on(Locator::new(fetch).locate(LocateOptions::default()));
        assert_eq!(fix, Err(LocationError::TimedOut));
    }

    #[test]
    fn server_error_is_unavailable() {
        let fetch = Canned::default().reply(503, "");
        let fix = block_on(Locator::new(fetch).locate(LocateOptions::default()));
        assert!(matches!(fix, Err(LocationError::Unavailable(_))));
    }

    #[test]
    fn garbage_is_unavailable() {
        assert!(matches!(parse("<html>"), Err(LocationError::Unavailable(_))));
    }
}
