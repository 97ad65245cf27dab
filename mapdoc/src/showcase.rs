//! The built-in showcase document suite
//!
//! One document per layer kind plus an all-in-one demo, composed through
//! the public builder API. The `build` command exports the whole suite;
//! the documents double as end-to-end fixtures.

use chrono::{DateTime, Duration, Utc};
use geojson::{Geometry, Value as GeoValue};
use serde_json::{json, Map};

use crate::document::MapDocument;
use crate::feature::{
    Feature, FeatureCollection, FieldTooltip, StyleFunction, TimeAnimatedCollection, TimedFeature,
};
use crate::geometry::{BoundingBox, Coordinate, Viewport};
use crate::layer::{
    ClusterMode, ControlKind, HeatLayer, Layer, MarkerCollection, MarkerStyle, PointMarker,
    PopupContent, ShapeGeometry, TileProvider, TileSource, VectorShape, VectorStyle,
    WeightedCoordinate,
};

const PARIS: Coordinate = Coordinate {
    lat: 48.8566,
    lon: 2.3522,
};

const EIFFEL: Coordinate = Coordinate {
    lat: 48.8584,
    lon: 2.2945,
};

const LOUVRE: Coordinate = Coordinate {
    lat: 48.8606,
    lon: 2.3376,
};

const CITE: Coordinate = Coordinate {
    lat: 48.853,
    lon: 2.3499,
};

/// Fixed base instant for the time-series demo. Artifacts must not embed
/// the wall clock.
fn timeline_base() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_564_800, 0).unwrap_or_default()
}

fn osm_basemap() -> Layer {
    Layer::Basemap {
        tiles: TileSource::Named(TileProvider::OpenStreetMap),
        attribution: None,
    }
}

fn centered(id: &str, title: &str, center: Coordinate, zoom: u8) -> MapDocument {
    let mut doc = MapDocument::new(id, title);
    doc.set_viewport(Viewport::CenterZoom { center, zoom });
    doc.add_layer(osm_basemap());
    doc
}

fn labeled_marker(coordinate: Coordinate, label: &str, popup: &str) -> PointMarker {
    PointMarker {
        coordinate,
        label: Some(label.to_string()),
        content: Some(PopupContent::Html(popup.to_string())),
        style: Some(MarkerStyle::Icon {
            color: "blue".to_string(),
            glyph: "info-sign".to_string(),
        }),
    }
}

fn places() -> Vec<(Coordinate, &'static str, &'static str)> {
    vec![
        (PARIS, "Paris", "<b>Paris</b><br>University years"),
        (
            Coordinate::new(35.6892, 51.3890),
            "Tehran",
            "<b>Tehran</b><br>Where it all began",
        ),
        (
            Coordinate::new(52.52, 13.405),
            "Berlin",
            "<b>Berlin</b><br>Dream job city",
        ),
    ]
}

/// Markers with popups, a colored pin icon, and a free-form div icon.
fn basic_markers() -> MapDocument {
    let mut doc = centered("01-basic-markers", "Basic markers", PARIS, 5);
    for (coordinate, label, popup) in places() {
        doc.add_layer(Layer::Marker(labeled_marker(coordinate, label, popup)));
    }
    doc.add_layer(Layer::Marker(PointMarker {
        coordinate: EIFFEL,
        label: None,
        content: Some(PopupContent::Html("Eiffel Tower".to_string())),
        style: Some(MarkerStyle::DivIcon {
            html: r#"<div style="font-size:24px">&#128508;</div>"#.to_string(),
        }),
    }));
    doc
}

/// Clustered and fast-clustered collections behind a toggle legend.
fn clusters() -> MapDocument {
    let mut doc = centered("02-clusters", "Marker clusters", PARIS, 12);

    let markers = (0..30)
        .map(|i| {
            let mut marker = PointMarker::at(Coordinate::new(
                PARIS.lat + 0.01 * f64::from(i),
                PARIS.lon + 0.01 * f64::from(i % 3),
            ));
            marker.content = Some(PopupContent::Html(format!("Point #{}", i)));
            marker
        })
        .collect();
    doc.add_layer(Layer::MarkerCollection(MarkerCollection {
        markers,
        clustering: ClusterMode::Cluster,
    }));

    let fast = (0..200)
        .map(|i| {
            PointMarker::at(Coordinate::new(
                PARIS.lat + 0.02 * f64::from(i % 6),
                PARIS.lon + 0.02 * f64::from(i / 6),
            ))
        })
        .collect();
    doc.add_layer(Layer::MarkerCollection(MarkerCollection {
        markers: fast,
        clustering: ClusterMode::FastCluster,
    }));

    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: true }));
    doc
}

fn heat_points() -> Vec<WeightedCoordinate> {
    [EIFFEL, LOUVRE, CITE]
        .iter()
        .cycle()
        .take(60)
        .map(|&coordinate| WeightedCoordinate {
            coordinate,
            weight: 1.0,
        })
        .collect()
}

fn heatmap() -> MapDocument {
    let mut doc = centered("03-heatmap", "Heat map", PARIS, 12);
    doc.add_layer(Layer::Heat(HeatLayer {
        points: heat_points(),
        radius: 15,
        blur: 10,
        min_opacity: 0.3,
    }));
    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: true }));
    doc
}

fn performance_path() -> Vec<Coordinate> {
    vec![PARIS, EIFFEL, LOUVRE, CITE]
}

fn stage_footprint() -> Vec<Coordinate> {
    vec![
        Coordinate::new(48.8575, 2.3500),
        Coordinate::new(48.8578, 2.3530),
        Coordinate::new(48.8555, 2.3540),
        Coordinate::new(48.8552, 2.3510),
    ]
}

/// Polyline, polygon, and circle primitives with tooltips.
fn paths_and_polygons() -> MapDocument {
    let mut doc = centered("04-paths-polygons", "Paths and polygons", PARIS, 12);
    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Line(performance_path()),
        style: VectorStyle {
            color: "purple".to_string(),
            weight: 4.0,
            opacity: 0.8,
            ..VectorStyle::default()
        },
        tooltip: Some("Performance path".to_string()),
    }));
    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Polygon(stage_footprint()),
        style: VectorStyle {
            color: "green".to_string(),
            fill: true,
            ..VectorStyle::default()
        },
        tooltip: Some("Stage footprint".to_string()),
    }));
    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Circle {
            center: PARIS,
            radius_m: 200.0,
        },
        style: VectorStyle {
            color: "red".to_string(),
            fill: true,
            fill_opacity: 0.1,
            ..VectorStyle::default()
        },
        tooltip: Some("200m radius".to_string()),
    }));
    doc
}

/// A rectangle overlay plus a second, templated basemap to toggle.
fn overlays_and_tiles() -> MapDocument {
    let mut doc = centered("05-overlays-tiles", "Overlays and tiles", PARIS, 13);
    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Rectangle(BoundingBox {
            south: 48.853,
            west: 2.345,
            north: 48.861,
            east: 2.36,
        }),
        style: VectorStyle {
            color: "#ff7800".to_string(),
            weight: 2.0,
            fill: true,
            fill_opacity: 0.15,
            ..VectorStyle::default()
        },
        tooltip: Some("Overlay rectangle".to_string()),
    }));
    doc.add_layer(Layer::Basemap {
        tiles: TileSource::Named(TileProvider::CartoPositron),
        attribution: None,
    });
    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: true }));
    doc
}

/// Named marker and heat groups switched through the toggle legend.
fn feature_groups() -> MapDocument {
    let mut doc = centered("06-feature-groups", "Feature groups", PARIS, 12);
    let markers = [PARIS, Coordinate::new(48.86, 2.34), Coordinate::new(48.85, 2.35)]
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut marker =
                PointMarker::at(Coordinate::new(c.lat + 0.002 * i as f64, c.lon + 0.002 * i as f64));
            marker.content = Some(PopupContent::Html(format!("Group marker {}", i)));
            marker
        })
        .collect();
    // Named groups so the toggle legend shows stable labels
    let _ = doc.add_named_layer(
        "markers-group",
        Layer::MarkerCollection(MarkerCollection {
            markers,
            clustering: ClusterMode::None,
        }),
    );
    let _ = doc.add_named_layer(
        "heat-group",
        Layer::Heat(HeatLayer {
            points: [PARIS, Coordinate::new(48.859, 2.348), Coordinate::new(48.853, 2.349)]
                .iter()
                .map(|&coordinate| WeightedCoordinate {
                    coordinate,
                    weight: 1.0,
                })
                .collect(),
            radius: 25,
            blur: 15,
            min_opacity: 0.4,
        }),
    );
    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: false }));
    doc
}

fn draw_plugin() -> MapDocument {
    let mut doc = centered("07-draw-plugin", "Draw plugin", PARIS, 13);
    doc.add_layer(Layer::Control(ControlKind::Draw {
        export: true,
        filename: "drawn_data.geojson".to_string(),
    }));
    doc
}

/// The full UI control suite plus a search over a named collection.
fn ui_controls() -> MapDocument {
    let mut doc = centered("08-ui-controls", "UI controls", PARIS, 12);
    doc.add_layer(Layer::Control(ControlKind::MiniMap));
    doc.add_layer(Layer::Control(ControlKind::Measure {
        primary_length_unit: "meters".to_string(),
    }));
    doc.add_layer(Layer::Control(ControlKind::Fullscreen));
    doc.add_layer(Layer::Control(ControlKind::Locate));

    let markers = places()
        .into_iter()
        .map(|(coordinate, label, popup)| PointMarker {
            coordinate,
            label: Some(label.to_string()),
            content: Some(PopupContent::Html(popup.to_string())),
            style: None,
        })
        .collect();
    let _ = doc.add_named_layer(
        "places",
        Layer::MarkerCollection(MarkerCollection {
            markers,
            clustering: ClusterMode::None,
        }),
    );
    doc.add_layer(Layer::Control(ControlKind::Search {
        target: "places".to_string(),
        key: "title".to_string(),
    }));
    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: true }));
    doc
}

/// Timestamped points walking across the city at a fixed cadence.
fn time_series() -> MapDocument {
    let mut doc = centered(
        "09-time-series",
        "Time series",
        Coordinate::new(48.8575, 2.3490),
        14,
    );
    let steps = [
        (48.8566, 2.3522),
        (48.8575, 2.3490),
        (48.8584, 2.3470),
        (48.8595, 2.3450),
    ];
    let records = steps
        .iter()
        .enumerate()
        .map(|(i, &(lat, lon))| TimedFeature {
            geometry: Geometry::new(GeoValue::Point(vec![lon, lat])),
            time: timeline_base() + Duration::seconds(10 * i as i64),
            style: Some(VectorStyle {
                color: "red".to_string(),
                ..VectorStyle::default()
            }),
            popup: Some(format!("t={}", i)),
        })
        .collect();
    doc.add_layer(Layer::TimeAnimated(TimeAnimatedCollection {
        records,
        period: "PT10S".to_string(),
        auto_play: false,
        loop_playback: false,
        max_speed: 1,
    }));
    doc
}

fn region(name: &str, value: i64, ring: Vec<Vec<f64>>) -> Feature {
    let mut properties = Map::new();
    properties.insert("name".to_string(), json!(name));
    properties.insert("value".to_string(), json!(value));
    Feature {
        geometry: Geometry::new(GeoValue::Polygon(vec![ring])),
        properties,
    }
}

/// Styled GeoJSON regions with a field tooltip; choropleth-style coloring
/// comes from a pure style function evaluated per feature.
fn geojson_regions() -> MapDocument {
    let mut doc = centered("10-geojson-regions", "GeoJSON regions", PARIS, 14);
    let features = vec![
        region(
            "Region A",
            10,
            vec![
                vec![2.34, 48.86],
                vec![2.36, 48.86],
                vec![2.36, 48.85],
                vec![2.34, 48.85],
                vec![2.34, 48.86],
            ],
        ),
        region(
            "Region B",
            40,
            vec![
                vec![2.36, 48.86],
                vec![2.38, 48.86],
                vec![2.38, 48.85],
                vec![2.36, 48.85],
                vec![2.36, 48.86],
            ],
        ),
    ];
    let _ = doc.add_named_layer(
        "regions",
        Layer::FeatureCollection(FeatureCollection {
            features,
            style: Some(StyleFunction::new(|properties| {
                let value = properties.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
                VectorStyle {
                    color: "black".to_string(),
                    weight: 1.0,
                    fill: true,
                    fill_color: if value < 20 { "#ffff00" } else { "#ff7800" }.to_string(),
                    fill_opacity: 0.5,
                    ..VectorStyle::default()
                }
            })),
            tooltip: Some(FieldTooltip {
                fields: vec!["name".to_string(), "value".to_string()],
                aliases: Some(vec!["Name:".to_string(), "Value:".to_string()]),
            }),
        }),
    );
    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: true }));
    doc
}

/// A marker whose popup is a framed sub-document.
fn rich_popup() -> MapDocument {
    let mut doc = centered("11-rich-popup", "Rich popup", PARIS, 13);
    let html = concat!(
        "<h4>Custom popup</h4>",
        "<p>This popup embeds a full sub-document.</p>",
        "<a href=\"https://en.wikipedia.org/wiki/Eiffel_Tower\" target=\"_blank\">",
        "Wikipedia: Eiffel Tower</a>",
    );
    doc.add_layer(Layer::Marker(PointMarker {
        coordinate: EIFFEL,
        label: None,
        content: Some(PopupContent::Frame {
            html: html.to_string(),
            width: 250,
            height: 260,
        }),
        style: None,
    }));
    doc
}

/// A basemap-free plan view on a flat pixel grid.
fn plan_view() -> MapDocument {
    let mut doc = MapDocument::new("12-plan-view", "Plan view");
    doc.declare_no_basemap();
    doc.set_viewport(Viewport::Bounds(BoundingBox {
        south: 0.0,
        west: 0.0,
        north: 60.0,
        east: 80.0,
    }));
    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Rectangle(BoundingBox {
            south: 0.0,
            west: 0.0,
            north: 60.0,
            east: 80.0,
        }),
        style: VectorStyle {
            color: "#444444".to_string(),
            weight: 2.0,
            ..VectorStyle::default()
        },
        tooltip: Some("Floor outline".to_string()),
    }));
    doc.add_layer(Layer::Marker(PointMarker {
        coordinate: Coordinate::new(30.0, 40.0),
        label: Some("Stage".to_string()),
        content: Some(PopupContent::Html("Main stage".to_string())),
        style: None,
    }));
    doc
}

/// Every layer kind and control on one map.
fn all_in_one() -> MapDocument {
    let mut doc = centered("00-all-in-one", "All in one", PARIS, 13);
    doc.add_layer(Layer::Basemap {
        tiles: TileSource::Named(TileProvider::CartoPositron),
        attribution: None,
    });
    doc.add_layer(Layer::Basemap {
        tiles: TileSource::Named(TileProvider::CartoDarkMatter),
        attribution: None,
    });

    let markers = (0..40)
        .map(|i| {
            let mut marker = PointMarker::at(Coordinate::new(
                PARIS.lat + 0.01 * f64::from(i),
                PARIS.lon + 0.01 * f64::from(i % 3),
            ));
            marker.content = Some(PopupContent::Html(format!("Cluster item {}", i)));
            marker
        })
        .collect();
    doc.add_layer(Layer::MarkerCollection(MarkerCollection {
        markers,
        clustering: ClusterMode::Cluster,
    }));

    doc.add_layer(Layer::Heat(HeatLayer {
        points: heat_points(),
        radius: 25,
        blur: 15,
        min_opacity: 0.4,
    }));

    let _ = doc.add_named_layer(
        "regions",
        Layer::FeatureCollection(FeatureCollection {
            features: vec![region(
                "Region A",
                10,
                vec![
                    vec![2.34, 48.86],
                    vec![2.36, 48.86],
                    vec![2.36, 48.85],
                    vec![2.34, 48.85],
                    vec![2.34, 48.86],
                ],
            )],
            style: None,
            tooltip: Some(FieldTooltip {
                fields: vec!["name".to_string(), "value".to_string()],
                aliases: None,
            }),
        }),
    );

    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Line(performance_path()),
        style: VectorStyle {
            color: "purple".to_string(),
            weight: 4.0,
            ..VectorStyle::default()
        },
        tooltip: Some("Path demo".to_string()),
    }));
    doc.add_layer(Layer::Shape(VectorShape {
        geometry: ShapeGeometry::Polygon(stage_footprint()),
        style: VectorStyle {
            color: "green".to_string(),
            fill: true,
            fill_opacity: 0.15,
            ..VectorStyle::default()
        },
        tooltip: Some("Stage polygon".to_string()),
    }));

    doc.add_layer(Layer::Control(ControlKind::MiniMap));
    doc.add_layer(Layer::Control(ControlKind::Measure {
        primary_length_unit: "meters".to_string(),
    }));
    doc.add_layer(Layer::Control(ControlKind::Fullscreen));
    doc.add_layer(Layer::Control(ControlKind::Draw {
        export: true,
        filename: "drawn_data.geojson".to_string(),
    }));
    doc.add_layer(Layer::Control(ControlKind::Locate));
    doc.add_layer(Layer::Control(ControlKind::LayerToggle { collapsed: false }));
    doc
}

/// The full suite, in export order.
pub fn documents() -> Vec<MapDocument> {
    vec![
        all_in_one(),
        basic_markers(),
        clusters(),
        heatmap(),
        paths_and_polygons(),
        overlays_and_tiles(),
        feature_groups(),
        draw_plugin(),
        ui_controls(),
        time_series(),
        geojson_regions(),
        rich_popup(),
        plan_view(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::bounds::BoundsCalculator;
    use crate::html_exporter::DocumentExporter;
    use crate::layer::LayerKind;
    use crate::pipeline;

    #[test]
    fn test_document_ids_are_unique() {
        let ids: Vec<String> = documents().iter().map(|d| d.id().to_string()).collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_every_layer_kind_is_exercised() {
        let kinds: HashSet<LayerKind> = documents()
            .iter()
            .flat_map(|d| d.layers().iter().map(|l| l.layer.kind()))
            .collect();
        for kind in [
            LayerKind::Basemap,
            LayerKind::Marker,
            LayerKind::MarkerCollection,
            LayerKind::Heat,
            LayerKind::Shape,
            LayerKind::FeatureCollection,
            LayerKind::TimeAnimated,
            LayerKind::Control,
        ] {
            assert!(kinds.contains(&kind), "missing layer kind {:?}", kind);
        }
    }

    #[test]
    fn test_whole_suite_exports() {
        let artifacts = pipeline::build_artifacts(
            &documents(),
            &BoundsCalculator::default(),
            &DocumentExporter::default(),
        )
        .unwrap();
        assert_eq!(artifacts.len(), 13);
        for artifact in &artifacts {
            assert!(!artifact.bytes.is_empty());
        }
    }

    #[test]
    fn test_suite_export_is_deterministic() {
        let exporter = DocumentExporter::default();
        let calculator = BoundsCalculator::default();
        let first = pipeline::build_artifacts(&documents(), &calculator, &exporter).unwrap();
        let second = pipeline::build_artifacts(&documents(), &calculator, &exporter).unwrap();
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.bytes, b.bytes);
        }
    }

    #[test]
    fn test_plan_view_declares_no_basemap() {
        let doc = plan_view();
        assert!(doc.no_basemap());
        assert!(doc
            .layers()
            .iter()
            .all(|l| !matches!(l.layer, Layer::Basemap { .. })));
    }
}
