use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use isahc::prelude::*;
use isahc::Request;

/// Status and body of a completed HTTP exchange.
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Why an HTTP exchange did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Timeout,
    Transport(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("request timed out"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Issues GET requests. Non-success statuses are returned, not raised.
pub trait Fetch: Send + Sync + 'static {
    fn get<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Response, FetchError>> + Send + 'a>>;
}

/// [`Fetch`] backed by an `isahc` client.
#[derive(Clone)]
pub struct Client {
    inner: isahc::HttpClient,
    user_agent: String,
}

impl Client {
    pub fn new(user_agent: impl Into<String>) -> Result<Self, FetchError> {
        let inner =
            isahc::HttpClient::new().map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            inner,
            user_agent: user_agent.into(),
        })
    }
}

impl Fetch for Client {
    fn get<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Response, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let request = Request::get(url)
                .timeout(timeout)
                .header("User-Agent", self.user_agent.as_str())
                .header("Accept", "application/json")
                .body(())
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            tracing::debug!(url, "GET");
            let mut response = self
                .inner
                .send_async(request)
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        FetchError::Timeout
                    } else {
                        FetchError::Transport(e.to_string())
                    }
                })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            tracing::debug!(status, size = body.len(), "response");
            Ok(Response { status, body })
        })
    }
}

/// Percent-encode a string for use in a URL query parameter.
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_pass_through() {
        assert_eq!(percent_encode("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
    }

    #[test]
    fn reserved_are_escaped() {
        assert_eq!(
            percent_encode("[out:json];node(around:1,2);"),
            "%5Bout%3Ajson%5D%3Bnode%28around%3A1%2C2%29%3B"
        );
    }

    #[test]
    fn space_and_quotes() {
        assert_eq!(percent_encode("a \"b\""), "a%20%22b%22");
    }

    #[test]
    fn success_range() {
        let ok = Response {
            status: 200,
            body: String::new(),
        };
        let busy = Response {
            status: 429,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!busy.is_success());
    }
}
