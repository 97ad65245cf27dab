//! Reference resolution: from a live document to a frozen, validated view
//!
//! Resolution is all-or-nothing. Any dangling reference or violated
//! document invariant fails the whole document before a single byte of
//! artifact exists. The input document is never mutated; resolving the
//! same document twice yields identical resolved contents.

use log::debug;
use thiserror::Error;

use crate::document::MapDocument;
use crate::geometry::Viewport;
use crate::layer::{ControlKind, Layer};
use crate::registry::NamedLayer;

/// Errors detected while resolving a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A control references a layer name the document does not contain.
    #[error("control '{control}' references unknown layer '{target}'")]
    DanglingReference { control: String, target: String },

    /// A search control targets a layer that is not a searchable collection.
    #[error("control '{control}' targets '{target}', which is not a marker or feature collection")]
    SearchTargetKind { control: String, target: String },

    /// The document has no basemap and no explicit no-basemap declaration.
    #[error("document '{0}' has no basemap layer; add one or declare the document basemap-free")]
    MissingBasemap(String),

    /// The document declares itself basemap-free but contains a basemap.
    #[error("document '{0}' declares no basemap but contains a basemap layer")]
    BasemapConflict(String),
}

/// A validated search control, bound to its target layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBinding {
    /// Name of the control layer carrying the search.
    pub control: String,
    /// Name of the collection being searched.
    pub target: String,
    /// Property or label key searched against.
    pub key: String,
}

/// An immutable, validated snapshot of a document, ready for framing
/// and export. Constructed only by [`ReferenceResolver::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    id: String,
    title: String,
    layers: Vec<NamedLayer>,
    searches: Vec<SearchBinding>,
    no_basemap: bool,
    /// Explicit viewport after resolution; filled in by the framing stage
    /// otherwise. Export refuses a document where this is still `None`.
    viewport: Option<Viewport>,
}

impl ResolvedDocument {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Layers in registry insertion order.
    pub fn layers(&self) -> &[NamedLayer] {
        &self.layers
    }

    pub fn search_bindings(&self) -> &[SearchBinding] {
        &self.searches
    }

    pub fn no_basemap(&self) -> bool {
        self.no_basemap
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Record the framing decision. Called by the bounds stage.
    pub fn set_framing(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Whether the document carries any overlay layer.
    pub fn has_overlays(&self) -> bool {
        self.layers.iter().any(|l| l.layer.is_overlay())
    }
}

/// Validates a document and freezes it into a [`ResolvedDocument`].
#[derive(Debug, Default)]
pub struct ReferenceResolver;

impl ReferenceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every control reference and check document invariants.
    pub fn resolve(&self, document: &MapDocument) -> Result<ResolvedDocument, ResolutionError> {
        let has_basemap = document
            .layers()
            .iter()
            .any(|l| matches!(l.layer, Layer::Basemap { .. }));

        if !has_basemap && !document.no_basemap() {
            return Err(ResolutionError::MissingBasemap(document.id().to_string()));
        }
        if has_basemap && document.no_basemap() {
            return Err(ResolutionError::BasemapConflict(document.id().to_string()));
        }

        let mut searches = Vec::new();
        for named in document.layers() {
            if let Layer::Control(ControlKind::Search { target, key }) = &named.layer {
                match document.get_layer(target) {
                    None => {
                        return Err(ResolutionError::DanglingReference {
                            control: named.name.clone(),
                            target: target.clone(),
                        });
                    }
                    Some(Layer::MarkerCollection(_)) | Some(Layer::FeatureCollection(_)) => {
                        searches.push(SearchBinding {
                            control: named.name.clone(),
                            target: target.clone(),
                            key: key.clone(),
                        });
                    }
                    Some(_) => {
                        return Err(ResolutionError::SearchTargetKind {
                            control: named.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        let mut layers = document.layers().to_vec();
        for named in &mut layers {
            if let Layer::TimeAnimated(collection) = &mut named.layer {
                // Vec::sort_by_key is stable, so equal timestamps keep
                // their insertion order.
                collection.records.sort_by_key(|r| r.time);
            }
        }

        debug!(
            "resolved document '{}': {} layers, {} search bindings",
            document.id(),
            layers.len(),
            searches.len()
        );

        Ok(ResolvedDocument {
            id: document.id().to_string(),
            title: document.title().to_string(),
            layers,
            searches,
            no_basemap: document.no_basemap(),
            viewport: document.viewport().copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use geojson::{Geometry, Value as GeoValue};

    use crate::feature::{Feature, FeatureCollection, TimeAnimatedCollection, TimedFeature};
    use crate::geometry::Coordinate;
    use crate::layer::{
        ClusterMode, MarkerCollection, PointMarker, TileProvider, TileSource, VectorStyle,
    };

    fn basemap() -> Layer {
        Layer::Basemap {
            tiles: TileSource::Named(TileProvider::OpenStreetMap),
            attribution: None,
        }
    }

    fn marker_collection(markers: Vec<PointMarker>) -> Layer {
        Layer::MarkerCollection(MarkerCollection {
            markers,
            clustering: ClusterMode::None,
        })
    }

    fn timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_missing_basemap_rejected() {
        let mut doc = MapDocument::new("bare", "Bare");
        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(0.0, 0.0))));
        let err = ReferenceResolver::new().resolve(&doc).unwrap_err();
        assert_eq!(err, ResolutionError::MissingBasemap("bare".to_string()));
    }

    #[test]
    fn test_declared_no_basemap_accepted() {
        let mut doc = MapDocument::new("plan", "Plan view");
        doc.declare_no_basemap();
        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(0.0, 0.0))));
        assert!(ReferenceResolver::new().resolve(&doc).is_ok());
    }

    #[test]
    fn test_basemap_conflict_rejected() {
        let mut doc = MapDocument::new("both", "Both");
        doc.declare_no_basemap();
        doc.add_layer(basemap());
        let err = ReferenceResolver::new().resolve(&doc).unwrap_err();
        assert_eq!(err, ResolutionError::BasemapConflict("both".to_string()));
    }

    #[test]
    fn test_dangling_search_fails_whole_document() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_named_layer(
            "find",
            Layer::Control(ControlKind::Search {
                target: "missing".to_string(),
                key: "label".to_string(),
            }),
        )
        .unwrap();
        let err = ReferenceResolver::new().resolve(&doc).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::DanglingReference {
                control: "find".to_string(),
                target: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_search_target_must_be_collection() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_named_layer(
            "lonely",
            Layer::Marker(PointMarker::at(Coordinate::new(0.0, 0.0))),
        )
        .unwrap();
        doc.add_named_layer(
            "find",
            Layer::Control(ControlKind::Search {
                target: "lonely".to_string(),
                key: "label".to_string(),
            }),
        )
        .unwrap();
        let err = ReferenceResolver::new().resolve(&doc).unwrap_err();
        assert!(matches!(err, ResolutionError::SearchTargetKind { .. }));
    }

    #[test]
    fn test_empty_search_target_is_valid() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_named_layer("stations", marker_collection(Vec::new()))
            .unwrap();
        doc.add_layer(Layer::Control(ControlKind::Search {
            target: "stations".to_string(),
            key: "label".to_string(),
        }));
        let resolved = ReferenceResolver::new().resolve(&doc).unwrap();
        assert_eq!(resolved.search_bindings().len(), 1);
        assert_eq!(resolved.search_bindings()[0].target, "stations");
    }

    #[test]
    fn test_feature_collection_search_target_accepted() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_named_layer(
            "regions",
            Layer::FeatureCollection(FeatureCollection {
                features: vec![Feature {
                    geometry: Geometry::new(GeoValue::Point(vec![0.0, 0.0])),
                    properties: serde_json::Map::new(),
                }],
                style: None,
                tooltip: None,
            }),
        )
        .unwrap();
        doc.add_layer(Layer::Control(ControlKind::Search {
            target: "regions".to_string(),
            key: "name".to_string(),
        }));
        assert!(ReferenceResolver::new().resolve(&doc).is_ok());
    }

    #[test]
    fn test_timed_records_sorted_stably() {
        let record = |time: &str, color: &str| TimedFeature {
            geometry: Geometry::new(GeoValue::Point(vec![0.0, 0.0])),
            time: timestamp(time),
            style: Some(VectorStyle {
                color: color.to_string(),
                ..VectorStyle::default()
            }),
            popup: None,
        };

        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_named_layer(
            "track",
            Layer::TimeAnimated(TimeAnimatedCollection {
                records: vec![
                    record("2024-01-01T00:00:20Z", "late"),
                    record("2024-01-01T00:00:10Z", "tie-a"),
                    record("2024-01-01T00:00:10Z", "tie-b"),
                ],
                period: "PT10S".to_string(),
                auto_play: false,
                loop_playback: false,
                max_speed: 1,
            }),
        )
        .unwrap();

        let resolved = ReferenceResolver::new().resolve(&doc).unwrap();
        let Layer::TimeAnimated(collection) = &resolved
            .layers()
            .iter()
            .find(|l| l.name == "track")
            .unwrap()
            .layer
        else {
            panic!("expected time-animated layer");
        };
        let colors: Vec<&str> = collection
            .records
            .iter()
            .map(|r| r.style.as_ref().unwrap().color.as_str())
            .collect();
        assert_eq!(colors, ["tie-a", "tie-b", "late"]);
    }

    #[test]
    fn test_resolve_is_idempotent_and_non_mutating() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_named_layer(
            "stations",
            marker_collection(vec![PointMarker::at(Coordinate::new(1.0, 2.0))]),
        )
        .unwrap();

        let resolver = ReferenceResolver::new();
        let first = resolver.resolve(&doc).unwrap();
        let second = resolver.resolve(&doc).unwrap();
        assert_eq!(first, second);

        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(9.0, 9.0))));
        assert_eq!(first.layers().len(), 2);
    }
}
