//! GeoJSON-backed layers: styled feature collections and timed records
//!
//! Geometry is carried through the `geojson` crate types. Positions there
//! are `[lon, lat]` pairs; coordinate extraction swaps them into the
//! lat-first convention the rest of the engine uses.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use geojson::Geometry;
use serde_json::{Map, Value};

use crate::geometry::Coordinate;
use crate::layer::VectorStyle;

/// A single GeoJSON feature: geometry plus free-form properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

/// A pure mapping from feature properties to a vector style.
///
/// Evaluated once per feature at export time; the resulting style is
/// embedded into the artifact, so identical properties always yield
/// identical bytes.
#[derive(Clone)]
pub struct StyleFunction(Arc<dyn Fn(&Map<String, Value>) -> VectorStyle + Send + Sync>);

impl StyleFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> VectorStyle + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn style_for(&self, properties: &Map<String, Value>) -> VectorStyle {
        (self.0)(properties)
    }
}

impl fmt::Debug for StyleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StyleFunction(..)")
    }
}

impl PartialEq for StyleFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Tooltip built from feature properties: which fields to show, and
/// optional display aliases matched positionally to the fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTooltip {
    pub fields: Vec<String>,
    pub aliases: Option<Vec<String>>,
}

/// A collection of GeoJSON features rendered as one toggleable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub style: Option<StyleFunction>,
    pub tooltip: Option<FieldTooltip>,
}

impl FeatureCollection {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        for feature in &self.features {
            collect_positions(&feature.geometry.value, &mut out);
        }
        out
    }
}

/// A feature pinned to a point in time for animated playback.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFeature {
    pub geometry: Geometry,
    pub time: DateTime<Utc>,
    pub style: Option<VectorStyle>,
    pub popup: Option<String>,
}

/// Features replayed along a time axis.
///
/// `period` is an ISO-8601 duration string (for example `PT10S`) governing
/// the playback step. Records are sorted ascending by timestamp during
/// resolution; ties keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAnimatedCollection {
    pub records: Vec<TimedFeature>,
    pub period: String,
    pub auto_play: bool,
    pub loop_playback: bool,
    pub max_speed: u32,
}

impl TimeAnimatedCollection {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        for record in &self.records {
            collect_positions(&record.geometry.value, &mut out);
        }
        out
    }
}

fn collect_positions(value: &geojson::Value, out: &mut Vec<Coordinate>) {
    use geojson::Value as V;
    match value {
        V::Point(position) => push_position(position, out),
        V::MultiPoint(positions) | V::LineString(positions) => {
            for position in positions {
                push_position(position, out);
            }
        }
        V::MultiLineString(lines) | V::Polygon(lines) => {
            for line in lines {
                for position in line {
                    push_position(position, out);
                }
            }
        }
        V::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    for position in ring {
                        push_position(position, out);
                    }
                }
            }
        }
        V::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_positions(&geometry.value, out);
            }
        }
    }
}

fn push_position(position: &[f64], out: &mut Vec<Coordinate>) {
    if let [lon, lat, ..] = position {
        out.push(Coordinate::new(*lat, *lon));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value as GeoValue;

    fn point(lon: f64, lat: f64) -> Geometry {
        Geometry::new(GeoValue::Point(vec![lon, lat]))
    }

    #[test]
    fn test_point_positions_swap_to_lat_lon() {
        let collection = FeatureCollection {
            features: vec![Feature {
                geometry: point(2.35, 48.85),
                properties: Map::new(),
            }],
            style: None,
            tooltip: None,
        };
        assert_eq!(collection.coordinates(), vec![Coordinate::new(48.85, 2.35)]);
    }

    #[test]
    fn test_polygon_positions() {
        let geometry = Geometry::new(GeoValue::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ]]));
        let collection = FeatureCollection {
            features: vec![Feature {
                geometry,
                properties: Map::new(),
            }],
            style: None,
            tooltip: None,
        };
        assert_eq!(collection.coordinates().len(), 4);
    }

    #[test]
    fn test_geometry_collection_recurses() {
        let geometry = Geometry::new(GeoValue::GeometryCollection(vec![
            point(10.0, 20.0),
            point(11.0, 21.0),
        ]));
        let collection = TimeAnimatedCollection {
            records: vec![TimedFeature {
                geometry,
                time: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
                style: None,
                popup: None,
            }],
            period: "PT10S".to_string(),
            auto_play: false,
            loop_playback: false,
            max_speed: 1,
        };
        assert_eq!(collection.coordinates().len(), 2);
    }

    #[test]
    fn test_style_function_evaluates_properties() {
        let function = StyleFunction::new(|properties| {
            let mut style = VectorStyle::default();
            if properties.get("danger").and_then(Value::as_bool) == Some(true) {
                style.color = "#ff0000".to_string();
            }
            style
        });

        let mut properties = Map::new();
        properties.insert("danger".to_string(), Value::Bool(true));
        assert_eq!(function.style_for(&properties).color, "#ff0000");
        assert_eq!(function.style_for(&Map::new()).color, "#3388ff");
    }
}
