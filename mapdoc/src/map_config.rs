//! Engine configuration from mapdoc.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bounds::BoundsCalculator;
use crate::geometry::Coordinate;
use crate::html_exporter::DocumentExporter;

/// Main engine configuration from mapdoc.toml
///
/// Every field has a default, so a partial file (or none at all) still
/// yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Framing used when a document contains no geometry at all
    pub fallback_center: ConfigCoordinate,

    /// Zoom level used together with `fallback_center`
    pub fallback_zoom: u8,

    /// Zoom level used when all geometry collapses to a single point
    pub single_point_zoom: u8,

    /// Whether documents with no overlay layers may be exported
    pub allow_empty_documents: bool,

    /// Attribution for templated tile URLs that carry none
    pub default_attribution: String,
}

/// A coordinate as written in the configuration file
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfigCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fallback_center: ConfigCoordinate { lat: 0.0, lon: 0.0 },
            fallback_zoom: 2,
            single_point_zoom: 16,
            allow_empty_documents: true,
            default_attribution: String::new(),
        }
    }
}

impl MapConfig {
    /// Load configuration from a mapdoc.toml file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapConfigError> {
        let content = fs::read_to_string(&path).map_err(MapConfigError::IoError)?;

        let config: MapConfig = toml::from_str(&content).map_err(MapConfigError::ParseError)?;

        Ok(config)
    }

    /// Load configuration from a mapdoc.toml file, falling back to the
    /// defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, MapConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a mapdoc.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MapConfigError> {
        let content = toml::to_string_pretty(self).map_err(MapConfigError::SerializeError)?;

        fs::write(&path, content).map_err(MapConfigError::IoError)?;

        Ok(())
    }

    /// The bounds calculator configured by this file
    pub fn bounds_calculator(&self) -> BoundsCalculator {
        BoundsCalculator {
            fallback_center: Coordinate::new(self.fallback_center.lat, self.fallback_center.lon),
            fallback_zoom: self.fallback_zoom,
            single_point_zoom: self.single_point_zoom,
        }
    }

    /// The exporter configured by this file
    pub fn exporter(&self) -> DocumentExporter {
        DocumentExporter::new(self.allow_empty_documents, self.default_attribution.clone())
    }
}

/// Errors that can occur when loading or saving engine configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum MapConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for MapConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapConfigError::IoError(e) => write!(f, "IO error: {}", e),
            MapConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            MapConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for MapConfigError {}
