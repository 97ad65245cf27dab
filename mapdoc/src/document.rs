//! Map document: identity, framing and the ordered layer set
//!
//! A document is built incrementally by its owning code. Export never works
//! on the live document; resolution takes a frozen snapshot, so mutating a
//! document after export has no effect on the produced artifact.

use crate::geometry::Viewport;
use crate::layer::Layer;
use crate::registry::{DuplicateNameError, LayerRegistry, NamedLayer};

/// A composable map document.
#[derive(Debug, Clone)]
pub struct MapDocument {
    /// Artifact identifier; becomes the output file stem.
    id: String,
    title: String,
    viewport: Option<Viewport>,
    no_basemap: bool,
    registry: LayerRegistry,
}

impl MapDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            viewport: None,
            no_basemap: false,
            registry: LayerRegistry::new(),
        }
    }

    /// Pin the initial framing, overriding automatic bounds.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Declare that this document intentionally ships without a basemap
    /// (plan views, abstract coordinate spaces).
    pub fn declare_no_basemap(&mut self) {
        self.no_basemap = true;
    }

    /// Add a layer under an engine-generated name; returns the name.
    pub fn add_layer(&mut self, layer: Layer) -> String {
        self.registry.add(layer)
    }

    /// Add a layer under an explicit name.
    pub fn add_named_layer(
        &mut self,
        name: impl Into<String>,
        layer: Layer,
    ) -> Result<String, DuplicateNameError> {
        self.registry.add_named(name, layer)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn no_basemap(&self) -> bool {
        self.no_basemap
    }

    pub fn layers(&self) -> &[NamedLayer] {
        self.registry.all()
    }

    pub fn get_layer(&self, name: &str) -> Option<&Layer> {
        self.registry.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;
    use crate::layer::{PointMarker, TileProvider, TileSource};

    #[test]
    fn test_document_accumulates_layers_in_order() {
        let mut doc = MapDocument::new("demo", "Demo");
        doc.add_layer(Layer::Basemap {
            tiles: TileSource::Named(TileProvider::OpenStreetMap),
            attribution: None,
        });
        let name = doc
            .add_named_layer(
                "City hall",
                Layer::Marker(PointMarker::at(Coordinate::new(48.85, 2.35))),
            )
            .unwrap();
        assert_eq!(name, "City hall");
        assert_eq!(doc.layers().len(), 2);
        assert_eq!(doc.layers()[1].name, "City hall");
        assert!(doc.get_layer("City hall").is_some());
    }

    #[test]
    fn test_duplicate_name_propagates() {
        let mut doc = MapDocument::new("demo", "Demo");
        let marker = Layer::Marker(PointMarker::at(Coordinate::new(0.0, 0.0)));
        doc.add_named_layer("spot", marker.clone()).unwrap();
        assert!(doc.add_named_layer("spot", marker).is_err());
    }
}
