use std::collections::HashMap;
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use nearstay_core::{Candidate, Coordinate, FeatureKind};

use super::FinderError;
use crate::http::{percent_encode, Fetch};

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Server-side time limit placed in the query, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// Lodging finder backed by the Overpass API over OpenStreetMap data.
pub struct Backend<F> {
    fetch: F,
    endpoint: String,
    kinds: Vec<String>,
    timeout: Duration,
}

impl<F: Fetch> Backend<F> {
    /// `kinds` are values of the `tourism` tag, e.g. `hotel` or `motel`.
    pub fn new(
        fetch: F,
        endpoint: impl Into<String>,
        kinds: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetch,
            endpoint: endpoint.into(),
            kinds,
            timeout,
        }
    }

    fn url(&self, center: Coordinate, radius_m: u32) -> String {
        let query = build_query(&self.kinds, center, radius_m);
        format!("{}?data={}", self.endpoint, percent_encode(&query))
    }
}

impl<F: Fetch> super::Finder for Backend<F> {
    fn search(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, FinderError>> + Send + '_>> {
        Box::pin(async move {
            let url = self.url(center, radius_m);
            let response = self
                .fetch
                .get(&url, self.timeout)
                .await
                .map_err(|e| FinderError::Network(e.to_string()))?;

            if !response.is_success() {
                return Err(FinderError::Network(format!(
                    "Overpass API returned status {}",
                    response.status
                )));
            }

            let candidates = parse_candidates(&response.body);
            tracing::debug!(count = candidates.len(), "parsed candidates");
            Ok(candidates)
        })
    }
}

/// Tag filter matching any of `kinds`.
fn tourism_filter(kinds: &[String]) -> String {
    match kinds {
        [] => r#"["tourism"="hotel"]"#.to_owned(),
        [kind] => format!(r#"["tourism"="{kind}"]"#),
        _ => format!(r#"["tourism"~"^({})$"]"#, kinds.join("|")),
    }
}

/// Overpass QL selecting lodging nodes, ways and relations around `center`,
/// with center points for the non-node features.
pub fn build_query(kinds: &[String], center: Coordinate, radius_m: u32) -> String {
    let filter = tourism_filter(kinds);
    let around = format!("(around:{radius_m},{},{})", center.lat, center.lon);
    let mut query = format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n(\n");
    for element in ["node", "way", "relation"] {
        let _ = writeln!(query, "  {element}{filter}{around};");
    }
    query.push_str(");\nout center;");
    query
}

#[derive(serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(serde::Deserialize)]
struct Center {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl Element {
    fn feature_kind(&self) -> Option<FeatureKind> {
        match self.kind.as_str() {
            "node" => Some(FeatureKind::Node),
            "way" => Some(FeatureKind::Way),
            "relation" => Some(FeatureKind::Relation),
            _ => None,
        }
    }

    /// Nodes are placed at their own position, areas at their center.
    fn position(&self) -> Option<Coordinate> {
        let own = both(self.lat, self.lon);
        let center = self.center.as_ref().and_then(|c| both(c.lat, c.lon));
        match self.feature_kind()? {
            FeatureKind::Node => own,
            FeatureKind::Way | FeatureKind::Relation => center.or(own),
        }
    }

    fn into_candidate(mut self) -> Option<Candidate> {
        let kind = self.feature_kind()?;
        let position = self.position()?;
        let name = self.tags.remove("name").filter(|n| !n.trim().is_empty());
        Some(Candidate {
            id: self.id,
            kind,
            name,
            position,
        })
    }
}

fn both(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinate> {
    Some(Coordinate::new(lat?, lon?))
}

/// Parse an Overpass JSON response. Malformed bodies yield no candidates.
/// Elements are read one by one, so an unreadable element or one without a
/// usable position is dropped without affecting the rest.
pub fn parse_candidates(body: &str) -> Vec<Candidate> {
    let response: QueryResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(%e, "unreadable Overpass response, treating as empty");
            return Vec::new();
        }
    };
    let received = response.elements.len();
    let candidates: Vec<Candidate> = response
        .elements
        .into_iter()
        .filter_map(|value| serde_json::from_value::<Element>(value).ok())
        .filter_map(Element::into_candidate)
        .collect();
    if candidates.len() < received {
        tracing::debug!(
            dropped = received - candidates.len(),
            "skipped elements without a position"
        );
    }
    candidates
}

#[cfg(test)]
mod tests {
    use futures_lite::future::block_on;

    use super::*;
    use crate::finder::Finder as _;
    use crate::http::testing::Canned;
    use crate::http::FetchError;

    fn hotels() -> Vec<String> {
        vec!["hotel".to_owned()]
    }

    fn backend(fetch: Canned) -> Backend<Canned> {
        Backend::new(fetch, DEFAULT_ENDPOINT, hotels(), Duration::from_secs(30))
    }

    #[test]
    fn query_covers_all_element_types() {
        let query = build_query(&hotels(), Coordinate::new(59.5, 10.25), 3000);
        assert_eq!(
            query,
            "[out:json][timeout:25];\n(\n  \
             node[\"tourism\"=\"hotel\"](around:3000,59.5,10.25);\n  \
             way[\"tourism\"=\"hotel\"](around:3000,59.5,10.25);\n  \
             relation[\"tourism\"=\"hotel\"](around:3000,59.5,10.25);\n\
             );\nout center;"
        );
    }

    #[test]
    fn several_kinds_use_regex() {
        let kinds = vec!["hotel".to_owned(), "motel".to_owned()];
        let query = build_query(&kinds, Coordinate::new(0.0, 0.0), 500);
        assert!(query.contains(r#"node["tourism"~"^(hotel|motel)$"](around:500,0,0);"#));
    }

    #[test]
    fn url_is_encoded() {
        let url = backend(Canned::default()).url(Coordinate::new(1.0, 2.0), 3000);
        assert!(url.starts_with("https://overpass-api.de/api/interpreter?data=%5Bout%3Ajson%5D"));
        assert!(!url[DEFAULT_ENDPOINT.len()..].contains(' '));
    }

    #[test]
    fn resolves_positions_and_names() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 1.0, "lon": 2.0, "tags": {"name": "Grand", "tourism": "hotel"}},
                {"type": "way", "id": 2, "center": {"lat": 3.0, "lon": 4.0}, "tags": {"tourism": "hotel"}},
                {"type": "relation", "id": 3, "center": {"lat": 5.0, "lon": 6.0}, "tags": {"name": "Plaza"}}
            ]
        }"#;
        let candidates = parse_candidates(body);
        assert_eq!(
            candidates,
            vec![
                Candidate {
                    id: 1,
                    kind: FeatureKind::Node,
                    name: Some("Grand".into()),
                    position: Coordinate::new(1.0, 2.0),
                },
                Candidate {
                    id: 2,
                    kind: FeatureKind::Way,
                    name: None,
                    position: Coordinate::new(3.0, 4.0),
                },
                Candidate {
                    id: 3,
                    kind: FeatureKind::Relation,
                    name: Some("Plaza".into()),
                    position: Coordinate::new(5.0, 6.0),
                },
            ]
        );
    }

    #[test]
    fn elements_without_position_are_skipped() {
        let body = r#"{"elements": [
            {"type": "way", "id": 1, "tags": {"name": "Nowhere"}},
            {"type": "node", "id": 2, "lat": 1.0},
            {"type": "node", "id": 3, "center": {"lat": 1.0, "lon": 1.0}},
            {"type": "area", "id": 4, "lat": 1.0, "lon": 1.0},
            {"type": "node", "id": 5, "lat": 1.0, "lon": 1.0}
        ]}"#;
        let ids: Vec<i64> = parse_candidates(body).iter().map(|c| c.id).collect();
        assert_eq!(ids, [5]);
    }

    #[test]
    fn partial_center_drops_only_that_element() {
        let body = r#"{"elements": [
            {"type": "node", "id": 1, "lat": 1.0, "lon": 1.0, "tags": {"name": "Kept"}},
            {"type": "way", "id": 2, "center": {"lat": 1.0}, "tags": {"name": "Half"}},
            {"type": "way", "id": 3, "center": {"lat": "north", "lon": 1.0}},
            {"type": "node", "id": 4, "lat": 1.0, "lon": 1.0, "tags": {"stars": 4}}
        ]}"#;
        let ids: Vec<i64> = parse_candidates(body).iter().map(|c| c.id).collect();
        assert_eq!(ids, [1]);
    }

    #[test]
    fn malformed_or_empty_body_is_no_results() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates("<html>rate limited</html>").is_empty());
        assert!(parse_candidates("{}").is_empty());
        assert!(parse_candidates(r#"{"elements": []}"#).is_empty());
    }

    #[test]
    fn search_sends_one_request() {
        let fetch = Canned::default().reply(
            200,
            r#"{"elements":[{"type":"node","id":7,"lat":0.5,"lon":0.5}]}"#,
        );
        let found = block_on(backend(fetch.clone()).search(Coordinate::new(0.0, 0.0), 3000));
        assert_eq!(found.map(|c| c.len()), Ok(1));
        assert_eq!(fetch.request_count(), 1);
    }

    #[test]
    fn non_success_status_is_network_error() {
        let fetch = Canned::default().reply(504, r#"{"elements":[]}"#);
        let found = block_on(backend(fetch).search(Coordinate::new(0.0, 0.0), 3000));
        assert_eq!(
            found,
            Err(FinderError::Network("Overpass API returned status 504".into()))
        );
    }

    #[test]
    fn transport_failure_is_network_error() {
        let fetch = Canned::default().fail(FetchError::Transport("connection refused".into()));
        let found = block_on(backend(fetch).search(Coordinate::new(0.0, 0.0), 3000));
        assert!(matches!(found, Err(FinderError::Network(_))));
    }
}
