//! Viewport framing: explicit viewport, computed bounds, or fallbacks
//!
//! Runs between resolution and export. An explicit document viewport is
//! passed through verbatim; otherwise the frame is the tightest box over
//! every geometry-bearing layer, with degenerate cases handled by
//! configured defaults.

use log::debug;

use crate::geometry::{BoundingBox, Coordinate, Viewport};
use crate::resolver::ResolvedDocument;

/// Computes the initial viewport of a resolved document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsCalculator {
    /// Center used when the document contains no geometry at all.
    pub fallback_center: Coordinate,
    /// Zoom used together with `fallback_center`.
    pub fallback_zoom: u8,
    /// Zoom used when all geometry collapses to a single point.
    pub single_point_zoom: u8,
}

impl Default for BoundsCalculator {
    fn default() -> Self {
        Self {
            fallback_center: Coordinate::new(0.0, 0.0),
            fallback_zoom: 2,
            single_point_zoom: 16,
        }
    }
}

impl BoundsCalculator {
    /// Decide the viewport for a resolved document.
    pub fn compute(&self, document: &ResolvedDocument) -> Viewport {
        if let Some(viewport) = document.viewport() {
            return *viewport;
        }

        let coords: Vec<Coordinate> = document
            .layers()
            .iter()
            .flat_map(|l| l.layer.coordinates())
            .collect();

        match BoundingBox::from_coordinates(&coords) {
            None => {
                debug!(
                    "document '{}' has no geometry, framing at fallback",
                    document.id()
                );
                Viewport::CenterZoom {
                    center: self.fallback_center,
                    zoom: self.fallback_zoom,
                }
            }
            Some(bbox) if bbox.is_point() => Viewport::CenterZoom {
                center: bbox.center(),
                zoom: self.single_point_zoom,
            },
            Some(bbox) => Viewport::Bounds(bbox),
        }
    }

    /// Compute and record the framing on the document.
    pub fn frame(&self, document: &mut ResolvedDocument) {
        let viewport = self.compute(document);
        document.set_framing(viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MapDocument;
    use crate::layer::{Layer, PointMarker, TileProvider, TileSource};
    use crate::resolver::ReferenceResolver;

    fn resolved(doc: &MapDocument) -> ResolvedDocument {
        ReferenceResolver::new().resolve(doc).unwrap()
    }

    fn basemap() -> Layer {
        Layer::Basemap {
            tiles: TileSource::Named(TileProvider::OpenStreetMap),
            attribution: None,
        }
    }

    #[test]
    fn test_explicit_viewport_wins_verbatim() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(10.0, 10.0))));
        doc.set_viewport(Viewport::CenterZoom {
            center: Coordinate::new(48.85, 2.35),
            zoom: 12,
        });
        let viewport = BoundsCalculator::default().compute(&resolved(&doc));
        assert_eq!(
            viewport,
            Viewport::CenterZoom {
                center: Coordinate::new(48.85, 2.35),
                zoom: 12,
            }
        );
    }

    #[test]
    fn test_no_geometry_uses_fallback() {
        let mut doc = MapDocument::new("empty", "Empty");
        doc.add_layer(basemap());
        let calculator = BoundsCalculator {
            fallback_center: Coordinate::new(51.5, -0.1),
            fallback_zoom: 5,
            single_point_zoom: 16,
        };
        let viewport = calculator.compute(&resolved(&doc));
        assert_eq!(
            viewport,
            Viewport::CenterZoom {
                center: Coordinate::new(51.5, -0.1),
                zoom: 5,
            }
        );
    }

    #[test]
    fn test_single_point_centers_at_max_zoom() {
        let mut doc = MapDocument::new("one", "One marker");
        doc.add_layer(basemap());
        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(
            48.8566, 2.3522,
        ))));
        let viewport = BoundsCalculator::default().compute(&resolved(&doc));
        let Viewport::CenterZoom { center, zoom } = viewport else {
            panic!("expected center/zoom framing");
        };
        assert_eq!(zoom, 16);
        assert!((center.lat - 48.8566).abs() < 1e-9);
        assert!((center.lon - 2.3522).abs() < 1e-9);
    }

    #[test]
    fn test_spread_geometry_produces_bounds() {
        let mut doc = MapDocument::new("two", "Two markers");
        doc.add_layer(basemap());
        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(40.0, -4.0))));
        doc.add_layer(Layer::Marker(PointMarker::at(Coordinate::new(52.0, 13.0))));
        let viewport = BoundsCalculator::default().compute(&resolved(&doc));
        let Viewport::Bounds(bbox) = viewport else {
            panic!("expected bounds framing");
        };
        assert_eq!(bbox.south, 40.0);
        assert_eq!(bbox.north, 52.0);
        assert_eq!(bbox.west, -4.0);
        assert_eq!(bbox.east, 13.0);
    }

    #[test]
    fn test_frame_records_viewport() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(basemap());
        let mut document = resolved(&doc);
        assert!(document.viewport().is_none());
        BoundsCalculator::default().frame(&mut document);
        assert!(document.viewport().is_some());
    }
}
