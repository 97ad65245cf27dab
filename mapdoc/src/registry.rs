//! Ordered layer registry with unique names
//!
//! Insertion order is draw order and toggle-legend order, so the registry
//! keeps a vector as the source of truth and a name index on the side.
//! Names are case-sensitive and never silently renamed.

use std::collections::HashMap;

use thiserror::Error;

use crate::layer::{Layer, LayerKind};

/// Adding a layer under a name the document already uses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate layer name: '{0}'")]
pub struct DuplicateNameError(pub String);

/// A layer together with its document-unique name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedLayer {
    pub name: String,
    pub layer: Layer,
}

/// Insertion-ordered layer storage for one document.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<NamedLayer>,
    index: HashMap<String, usize>,
    counters: HashMap<LayerKind, u32>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer under an engine-generated name and return that name.
    ///
    /// Generated names are `<kind-slug>-<ordinal>` with a per-kind counter
    /// that only ever increases, so names are stable across re-export of
    /// the same build sequence. A generated name colliding with an earlier
    /// explicit name is skipped, advancing the counter.
    pub fn add(&mut self, layer: Layer) -> String {
        let kind = layer.kind();
        loop {
            let counter = self.counters.entry(kind).or_insert(0);
            *counter += 1;
            let candidate = format!("{}-{}", kind.slug(), counter);
            if !self.index.contains_key(&candidate) {
                self.insert(candidate.clone(), layer);
                return candidate;
            }
        }
    }

    /// Add a layer under an explicit name.
    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        layer: Layer,
    ) -> Result<String, DuplicateNameError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(DuplicateNameError(name));
        }
        self.insert(name.clone(), layer);
        Ok(name)
    }

    fn insert(&mut self, name: String, layer: Layer) {
        self.index.insert(name.clone(), self.layers.len());
        self.layers.push(NamedLayer { name, layer });
    }

    /// Look up a layer by exact name.
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.index.get(name).map(|&i| &self.layers[i].layer)
    }

    /// All layers in insertion order.
    pub fn all(&self) -> &[NamedLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;
    use crate::layer::{HeatLayer, PointMarker};

    fn heat() -> Layer {
        Layer::Heat(HeatLayer {
            points: Vec::new(),
            radius: 15,
            blur: 10,
            min_opacity: 0.3,
        })
    }

    #[test]
    fn test_generated_names_count_per_kind() {
        let mut registry = LayerRegistry::new();
        assert_eq!(registry.add(heat()), "heat-1");
        assert_eq!(
            registry.add(Layer::Marker(PointMarker::at(Coordinate::new(0.0, 0.0)))),
            "marker-1"
        );
        assert_eq!(registry.add(heat()), "heat-2");
    }

    #[test]
    fn test_duplicate_explicit_name_rejected() {
        let mut registry = LayerRegistry::new();
        registry.add_named("Crime heat", heat()).unwrap();
        let err = registry.add_named("Crime heat", heat()).unwrap_err();
        assert_eq!(err, DuplicateNameError("Crime heat".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = LayerRegistry::new();
        registry.add_named("Heat", heat()).unwrap();
        assert!(registry.add_named("heat", heat()).is_ok());
        assert!(registry.get("Heat").is_some());
        assert!(registry.get("heat").is_some());
        assert!(registry.get("HEAT").is_none());
    }

    #[test]
    fn test_generated_name_skips_explicit_collision() {
        let mut registry = LayerRegistry::new();
        registry.add_named("heat-1", heat()).unwrap();
        assert_eq!(registry.add(heat()), "heat-2");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut registry = LayerRegistry::new();
        registry.add_named("b", heat()).unwrap();
        registry.add_named("a", heat()).unwrap();
        registry.add_named("c", heat()).unwrap();
        let names: Vec<&str> = registry.all().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
