//! Layer model: the closed set of overlay, basemap and control kinds
//!
//! A document is an ordered list of named layers. Each variant here carries
//! everything the exporter needs to emit its rendering calls; the core never
//! fetches tiles or evaluates geometry beyond coordinate extraction.

use crate::feature::{FeatureCollection, TimeAnimatedCollection};
use crate::geometry::{BoundingBox, Coordinate};

/// A named tile provider with a known URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileProvider {
    OpenStreetMap,
    CartoPositron,
    CartoDarkMatter,
}

impl TileProvider {
    /// The Leaflet URL template for this provider.
    pub fn url_template(&self) -> &'static str {
        match self {
            TileProvider::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileProvider::CartoPositron => {
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
            }
            TileProvider::CartoDarkMatter => {
                "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png"
            }
        }
    }

    /// Attribution required by the provider's usage policy.
    pub fn default_attribution(&self) -> &'static str {
        match self {
            TileProvider::OpenStreetMap => {
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
            }
            TileProvider::CartoPositron | TileProvider::CartoDarkMatter => {
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>"
            }
        }
    }

    /// Display name used in the layer toggle legend.
    pub fn display_name(&self) -> &'static str {
        match self {
            TileProvider::OpenStreetMap => "OpenStreetMap",
            TileProvider::CartoPositron => "CartoDB Positron",
            TileProvider::CartoDarkMatter => "CartoDB Dark Matter",
        }
    }
}

/// Where a basemap's tiles come from. The source is opaque to the core;
/// tiles are never fetched during export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    /// One of the known named providers.
    Named(TileProvider),
    /// A free-form `{z}/{x}/{y}` URL template.
    UrlTemplate { url: String },
}

impl TileSource {
    pub fn url_template(&self) -> &str {
        match self {
            TileSource::Named(provider) => provider.url_template(),
            TileSource::UrlTemplate { url } => url,
        }
    }
}

/// Popup content attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupContent {
    /// Raw HTML rendered directly inside the popup.
    Html(String),
    /// An embedded sub-document, framed in an iframe via a base64 data URL.
    Frame { html: String, width: u32, height: u32 },
}

/// Visual style of a point marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerStyle {
    /// A colored pin with a glyph name (Leaflet `L.AwesomeMarkers` style).
    Icon { color: String, glyph: String },
    /// A free-form HTML div standing in for the marker image.
    DivIcon { html: String },
}

/// A single point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    pub coordinate: Coordinate,
    /// Hover tooltip text.
    pub label: Option<String>,
    pub content: Option<PopupContent>,
    pub style: Option<MarkerStyle>,
}

impl PointMarker {
    /// A bare marker at a coordinate, no popup, default pin.
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            label: None,
            content: None,
            style: None,
        }
    }
}

/// How a marker collection groups nearby markers at low zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterMode {
    None,
    Cluster,
    FastCluster,
}

/// A collection of point markers rendered as one toggleable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCollection {
    pub markers: Vec<PointMarker>,
    pub clustering: ClusterMode,
}

/// A coordinate with an intensity weight for heat rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedCoordinate {
    pub coordinate: Coordinate,
    pub weight: f64,
}

/// A heat map layer over weighted points.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatLayer {
    pub points: Vec<WeightedCoordinate>,
    pub radius: u32,
    pub blur: u32,
    pub min_opacity: f64,
}

/// Geometry of a vector shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    /// An open polyline through the given coordinates.
    Line(Vec<Coordinate>),
    /// A closed ring; the closing edge is implicit.
    Polygon(Vec<Coordinate>),
    /// A circle with a radius in meters.
    Circle { center: Coordinate, radius_m: f64 },
    /// An axis-aligned rectangle.
    Rectangle(BoundingBox),
}

/// Stroke and fill styling for vector shapes and styled features.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill: bool,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            weight: 3.0,
            opacity: 1.0,
            fill: false,
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.2,
        }
    }
}

/// A drawn vector primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorShape {
    pub geometry: ShapeGeometry,
    pub style: VectorStyle,
    pub tooltip: Option<String>,
}

/// An interactive UI control attached to the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    /// The legend toggling overlay visibility.
    LayerToggle { collapsed: bool },
    /// An inset overview map in the corner.
    MiniMap,
    /// Distance and area measurement tool.
    Measure { primary_length_unit: String },
    Fullscreen,
    /// Geolocation button centering on the viewer.
    Locate,
    /// Freehand drawing toolbar, optionally with a GeoJSON export button.
    Draw { export: bool, filename: String },
    /// Text search over the entries of a named layer.
    ///
    /// `target` must name a marker or feature collection in the same
    /// document; `key` is the property or label searched against.
    Search { target: String, key: String },
}

impl ControlKind {
    /// Short identifier used in error messages and generated names.
    pub fn label(&self) -> &'static str {
        match self {
            ControlKind::LayerToggle { .. } => "layer-toggle",
            ControlKind::MiniMap => "minimap",
            ControlKind::Measure { .. } => "measure",
            ControlKind::Fullscreen => "fullscreen",
            ControlKind::Locate => "locate",
            ControlKind::Draw { .. } => "draw",
            ControlKind::Search { .. } => "search",
        }
    }
}

/// The kind of a layer, used for generated names and plugin selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Basemap,
    Marker,
    MarkerCollection,
    Heat,
    Shape,
    FeatureCollection,
    TimeAnimated,
    Control,
}

impl LayerKind {
    /// Slug used as the prefix of engine-generated layer names.
    pub fn slug(&self) -> &'static str {
        match self {
            LayerKind::Basemap => "basemap",
            LayerKind::Marker => "marker",
            LayerKind::MarkerCollection => "markers",
            LayerKind::Heat => "heat",
            LayerKind::Shape => "shape",
            LayerKind::FeatureCollection => "geojson",
            LayerKind::TimeAnimated => "timeline",
            LayerKind::Control => "control",
        }
    }
}

/// One layer of a map document.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// A tile basemap. Not an overlay; contributes no geometry.
    Basemap {
        tiles: TileSource,
        attribution: Option<String>,
    },
    Marker(PointMarker),
    MarkerCollection(MarkerCollection),
    Heat(HeatLayer),
    Shape(VectorShape),
    FeatureCollection(FeatureCollection),
    TimeAnimated(TimeAnimatedCollection),
    /// A UI control. Not an overlay; contributes no geometry.
    Control(ControlKind),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Basemap { .. } => LayerKind::Basemap,
            Layer::Marker(_) => LayerKind::Marker,
            Layer::MarkerCollection(_) => LayerKind::MarkerCollection,
            Layer::Heat(_) => LayerKind::Heat,
            Layer::Shape(_) => LayerKind::Shape,
            Layer::FeatureCollection(_) => LayerKind::FeatureCollection,
            Layer::TimeAnimated(_) => LayerKind::TimeAnimated,
            Layer::Control(_) => LayerKind::Control,
        }
    }

    /// Whether this layer carries map data, as opposed to a basemap or
    /// a UI control. Documents with zero overlays count as empty.
    pub fn is_overlay(&self) -> bool {
        !matches!(self, Layer::Basemap { .. } | Layer::Control(_))
    }

    /// All coordinates this layer contributes to automatic bounds.
    ///
    /// Basemaps and controls contribute nothing. Circles contribute only
    /// their center; the radius is a rendering concern.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        match self {
            Layer::Basemap { .. } | Layer::Control(_) => Vec::new(),
            Layer::Marker(marker) => vec![marker.coordinate],
            Layer::MarkerCollection(collection) => {
                collection.markers.iter().map(|m| m.coordinate).collect()
            }
            Layer::Heat(heat) => heat.points.iter().map(|p| p.coordinate).collect(),
            Layer::Shape(shape) => match &shape.geometry {
                ShapeGeometry::Line(coords) | ShapeGeometry::Polygon(coords) => coords.clone(),
                ShapeGeometry::Circle { center, .. } => vec![*center],
                ShapeGeometry::Rectangle(bbox) => vec![
                    Coordinate::new(bbox.south, bbox.west),
                    Coordinate::new(bbox.north, bbox.east),
                ],
            },
            Layer::FeatureCollection(collection) => collection.coordinates(),
            Layer::TimeAnimated(collection) => collection.coordinates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_kind_slugs_are_distinct() {
        let kinds = [
            LayerKind::Basemap,
            LayerKind::Marker,
            LayerKind::MarkerCollection,
            LayerKind::Heat,
            LayerKind::Shape,
            LayerKind::FeatureCollection,
            LayerKind::TimeAnimated,
            LayerKind::Control,
        ];
        let mut slugs: Vec<&str> = kinds.iter().map(|k| k.slug()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), kinds.len());
    }

    #[test]
    fn test_basemap_and_control_are_not_overlays() {
        let basemap = Layer::Basemap {
            tiles: TileSource::Named(TileProvider::OpenStreetMap),
            attribution: None,
        };
        let control = Layer::Control(ControlKind::Fullscreen);
        let marker = Layer::Marker(PointMarker::at(Coordinate::new(48.85, 2.35)));
        assert!(!basemap.is_overlay());
        assert!(!control.is_overlay());
        assert!(marker.is_overlay());
        assert!(basemap.coordinates().is_empty());
        assert!(control.coordinates().is_empty());
    }

    #[test]
    fn test_shape_coordinates() {
        let rect = Layer::Shape(VectorShape {
            geometry: ShapeGeometry::Rectangle(BoundingBox {
                south: 40.0,
                west: -4.0,
                north: 41.0,
                east: -3.0,
            }),
            style: VectorStyle::default(),
            tooltip: None,
        });
        assert_eq!(rect.coordinates().len(), 2);

        let circle = Layer::Shape(VectorShape {
            geometry: ShapeGeometry::Circle {
                center: Coordinate::new(45.0, 5.0),
                radius_m: 500.0,
            },
            style: VectorStyle::default(),
            tooltip: None,
        });
        assert_eq!(circle.coordinates(), vec![Coordinate::new(45.0, 5.0)]);
    }

    #[test]
    fn test_named_provider_has_attribution() {
        for provider in [
            TileProvider::OpenStreetMap,
            TileProvider::CartoPositron,
            TileProvider::CartoDarkMatter,
        ] {
            assert!(provider.url_template().contains("{z}"));
            assert!(provider.default_attribution().contains("OpenStreetMap"));
        }
    }
}
