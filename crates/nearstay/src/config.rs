//! Settings from built-in defaults, an optional JSON file and the command
//! line, in increasing order of precedence.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use exn::ResultExt;
use nearstay_core::Coordinate;

use crate::cli::Args;
use crate::finder::{overpass, DEFAULT_RADIUS_M};

const APP_DIR: &str = "nearstay";
const CONFIG_FILE: &str = "config.json";
const MAP_FILE: &str = "map.html";

#[derive(Debug)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Fixed position. Takes precedence over IP lookup.
    pub location: Option<Coordinate>,
    pub ip_lookup: bool,
    pub radius_m: u32,
    pub limit: usize,
    /// Values of the `tourism` tag to search for.
    pub kinds: Vec<String>,
    pub endpoint: String,
    /// Where the map page is written. `None` disables it.
    pub map_path: Option<PathBuf>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: None,
            ip_lookup: true,
            radius_m: DEFAULT_RADIUS_M,
            limit: nearstay_core::rank::DEFAULT_LIMIT,
            kinds: vec!["hotel".to_owned()],
            endpoint: overpass::DEFAULT_ENDPOINT.to_owned(),
            map_path: dirs::data_dir().map(|d| d.join(APP_DIR).join(MAP_FILE)),
            user_agent: format!("nearstay/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
        }
    }
}

/// Default location of the config file.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> exn::Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).or_raise(|| Error(format!("read config {}", path.display())));
            }
        };
        let settings: Self = serde_json::from_str(&text)
            .or_raise(|| Error(format!("parse config {}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// Load the config file named by `args` (or the default one) and apply
    /// the flags on top.
    pub fn load(args: &Args) -> exn::Result<Self, Error> {
        let path = args.config.clone().or_else(default_path);
        let settings = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.with_args(args)
    }

    fn with_args(mut self, args: &Args) -> exn::Result<Self, Error> {
        match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => self.location = Some(Coordinate::new(lat, lon)),
            (None, None) => {}
            _ => {
                exn::bail!(Error("--lat and --lon must be given together".into()));
            }
        }
        if args.no_ip {
            self.ip_lookup = false;
        }
        if let Some(radius) = args.radius {
            self.radius_m = radius;
        }
        if let Some(limit) = args.limit {
            self.limit = limit;
        }
        if !args.kind.is_empty() {
            self.kinds.clone_from(&args.kind);
        }
        if let Some(endpoint) = &args.endpoint {
            self.endpoint.clone_from(endpoint);
        }
        if args.no_map {
            self.map_path = None;
        } else if let Some(map) = &args.map {
            self.map_path = Some(map.clone());
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> exn::Result<(), Error> {
        if self.limit == 0 {
            exn::bail!(Error("limit must be at least 1".into()));
        }
        if self.radius_m == 0 {
            exn::bail!(Error("radius must be at least 1 meter".into()));
        }
        if let Some(bad) = self
            .kinds
            .iter()
            .find(|k| k.is_empty() || !k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        {
            exn::bail!(Error(format!("invalid lodging kind {bad:?}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("nearstay").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.radius_m, 3000);
        assert_eq!(settings.limit, 6);
        assert_eq!(settings.kinds, ["hotel"]);
        assert!(settings.ip_lookup);
        assert!(settings.location.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"radius_m": 1500, "location": {"lat": 1.5, "lon": 2.5}}"#)
                .unwrap();
        assert_eq!(settings.radius_m, 1500);
        assert_eq!(settings.location, Some(Coordinate::new(1.5, 2.5)));
        assert_eq!(settings.limit, 6);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<Settings>(r#"{"radius": 1500}"#).is_err());
    }

    #[test]
    fn null_map_path_disables_map() {
        let settings: Settings = serde_json::from_str(r#"{"map_path": null}"#).unwrap();
        assert!(settings.map_path.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("nearstay-does-not-exist.json");
        assert_eq!(Settings::from_file(&path).unwrap(), Settings::default());
    }

    #[test]
    fn malformed_file_is_error() {
        let path = std::env::temp_dir().join(format!("nearstay-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::from_file(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn flags_override_file() {
        let settings = Settings::default()
            .with_args(&args(&[
                "--lat", "59.9", "--lon", "10.7", "--radius", "500", "--limit", "3", "--kind",
                "hotel", "--kind", "hostel", "--no-ip", "--no-map",
            ]))
            .unwrap();
        assert_eq!(settings.location, Some(Coordinate::new(59.9, 10.7)));
        assert_eq!(settings.radius_m, 500);
        assert_eq!(settings.limit, 3);
        assert_eq!(settings.kinds, ["hotel", "hostel"]);
        assert!(!settings.ip_lookup);
        assert!(settings.map_path.is_none());
    }

    #[test]
    fn lat_without_lon_is_error() {
        assert!(Settings::default().with_args(&args(&["--lat", "1.0"])).is_err());
    }

    #[test]
    fn zero_limit_is_error() {
        assert!(Settings::default().with_args(&args(&["--limit", "0"])).is_err());
    }

    #[test]
    fn kinds_cannot_inject_query() {
        let bad = args(&["--kind", "hotel\"];node(1)"]);
        assert!(Settings::default().with_args(&bad).is_err());
    }
}
