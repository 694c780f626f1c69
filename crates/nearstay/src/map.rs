//! The map view: the user's position and one marker per shown hotel.
//!
//! The view is written as a standalone Leaflet page so any browser can show
//! it. Tiles come from the OpenStreetMap tile servers.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use exn::ResultExt;
use nearstay_core::{Coordinate, RankedHotel};

/// Zoom level the view opens at.
pub const ZOOM: u8 = 15;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";
const LEAFLET: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet";

#[derive(Debug)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub popup: String,
}

/// Everything the map shows. Created on the first position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_url: &'static str,
    pub user: Marker,
    pub results: Vec<Marker>,
}

impl MapState {
    fn new(center: Coordinate) -> Self {
        Self {
            center,
            zoom: ZOOM,
            tile_url: TILE_URL,
            user: Marker {
                position: center,
                popup: "You are here".to_owned(),
            },
            results: Vec::new(),
        }
    }
}

/// Owns the map state and keeps the rendered page in step with it.
pub struct MapPresenter {
    state: Option<MapState>,
    output: Option<PathBuf>,
}

impl MapPresenter {
    /// A presenter that writes its page to `output`, if given.
    pub const fn new(output: Option<PathBuf>) -> Self {
        Self {
            state: None,
            output,
        }
    }

    pub const fn state(&self) -> Option<&MapState> {
        self.state.as_ref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Create the map at `position`, or move the existing view and user
    /// marker there.
    pub fn init_or_recenter(&mut self, position: Coordinate) {
        match &mut self.state {
            Some(state) => {
                state.center = position;
                state.user.position = position;
                tracing::debug!(%position, "map recentered");
            }
            None => {
                self.state = Some(MapState::new(position));
                tracing::debug!(%position, zoom = ZOOM, "map created");
            }
        }
        self.publish();
    }

    /// Replace all result markers with one per hotel.
    ///
    /// Does nothing before the map exists.
    pub fn plot_results(&mut self, hotels: &[RankedHotel]) {
        let Some(state) = &mut self.state else {
            return;
        };
        state.results = hotels
            .iter()
            .map(|h| Marker {
                position: h.position(),
                popup: h.to_string(),
            })
            .collect();
        self.publish();
    }

    pub fn clear_results(&mut self) {
        self.plot_results(&[]);
    }

    fn publish(&self) {
        let (Some(state), Some(path)) = (&self.state, &self.output) else {
            return;
        };
        if let Err(e) = write_page(path, state) {
            tracing::warn!(%e, "failed to write map page");
        }
    }
}

fn write_page(path: &Path, state: &MapState) -> exn::Result<(), Error> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .or_raise(|| Error(format!("create map directory {}", dir.display())))?;
    }
    let html = render_html(state)?;
    fs::write(path, html).or_raise(|| Error(format!("write map page {}", path.display())))?;
    tracing::debug!(path = %path.display(), markers = state.results.len(), "map page written");
    Ok(())
}

/// JSON safe to embed inside a `<script>` element.
fn script_json<T: serde::Serialize>(value: &T) -> exn::Result<String, Error> {
    let json = serde_json::to_string(value).or_raise(|| Error("serialize map data".into()))?;
    Ok(json.replace("</", "<\\/"))
}

/// Render `state` as a standalone Leaflet page.
pub fn render_html(state: &MapState) -> exn::Result<String, Error> {
    let data = serde_json::json!({
        "center": [state.center.lat, state.center.lon],
        "zoom": state.zoom,
        "tiles": state.tile_url,
        "attribution": ATTRIBUTION,
        "user": state.user,
        "results": state.results,
    });
    let data = script_json(&data)?;

    Ok(format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Hotels nearby</title>
<link rel="stylesheet" href="{LEAFLET}.css">
<script src="{LEAFLET}.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const data = {data};
const map = L.map("map").setView(data.center, data.zoom);
L.tileLayer(data.tiles, {{ maxZoom: 19, attribution: data.attribution }}).addTo(map);
const pin = (m) => [m.position.lat, m.position.lon];
L.circleMarker(pin(data.user), {{ radius: 8, color: "#1e88e5" }})
  .addTo(map)
  .bindPopup(document.createTextNode(data.user.popup));
const results = L.layerGroup().addTo(map);
for (const m of data.results) {{
  L.marker(pin(m)).addTo(results).bindPopup(document.createTextNode(m.popup));
}}
</script>
</body>
</html>
"##
    ))
}
