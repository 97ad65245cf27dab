//! HTML exporter for resolved map documents
//!
//! This module exports a ResolvedDocument to a single self-contained HTML
//! file with:
//! - All layer data inlined as JSON literals
//! - Rendering delegated to Leaflet and its plugins via CDN assets
//! - Plugin assets included only for the layer kinds actually present
//!
//! Output is byte-for-byte deterministic for an unchanged resolved
//! document: no wall-clock timestamps, no random identifiers, JSON objects
//! with sorted keys, assets in a fixed order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use itertools::Itertools;
use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::artifact::Artifact;
use crate::feature::{FeatureCollection, FieldTooltip, TimeAnimatedCollection};
use crate::geometry::{Coordinate, Viewport};
use crate::layer::{
    ClusterMode, ControlKind, HeatLayer, Layer, MarkerCollection, MarkerStyle, PointMarker,
    PopupContent, ShapeGeometry, TileSource, VectorShape, VectorStyle,
};
use crate::resolver::ResolvedDocument;

/// Errors that can occur during HTML export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("document '{0}' was never framed; run the bounds stage before export")]
    UnresolvedDocument(String),

    #[error("document '{0}' has no overlay layers and empty documents are disallowed")]
    EmptyDocument(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exports resolved documents to self-contained Leaflet HTML artifacts.
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    /// Whether documents with no overlay layers may be exported as
    /// basemap-only artifacts.
    allow_empty: bool,
    /// Attribution used for templated tile URLs that carry none.
    default_attribution: String,
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self {
            allow_empty: true,
            default_attribution: String::new(),
        }
    }
}

/// Which plugin asset groups an artifact needs, derived from the layers
/// present. Emission order is the field order here, always.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PluginNeeds {
    icon_markers: bool,
    cluster: bool,
    heat: bool,
    time_dimension: bool,
    minimap: bool,
    measure: bool,
    fullscreen: bool,
    locate: bool,
    draw: bool,
    search: bool,
}

impl PluginNeeds {
    fn scan(document: &ResolvedDocument) -> Self {
        let mut needs = Self::default();
        for named in document.layers() {
            match &named.layer {
                Layer::Marker(marker) => {
                    if matches!(marker.style, Some(MarkerStyle::Icon { .. })) {
                        needs.icon_markers = true;
                    }
                }
                Layer::MarkerCollection(collection) => {
                    if collection.clustering != ClusterMode::None {
                        needs.cluster = true;
                    }
                    for marker in &collection.markers {
                        if matches!(marker.style, Some(MarkerStyle::Icon { .. })) {
                            needs.icon_markers = true;
                        }
                    }
                }
                Layer::Heat(_) => needs.heat = true,
                Layer::TimeAnimated(_) => needs.time_dimension = true,
                Layer::Control(kind) => match kind {
                    ControlKind::MiniMap => needs.minimap = true,
                    ControlKind::Measure { .. } => needs.measure = true,
                    ControlKind::Fullscreen => needs.fullscreen = true,
                    ControlKind::Locate => needs.locate = true,
                    ControlKind::Draw { .. } => needs.draw = true,
                    ControlKind::Search { .. } => needs.search = true,
                    ControlKind::LayerToggle { .. } => {}
                },
                Layer::Basemap { .. } | Layer::Shape(_) | Layer::FeatureCollection(_) => {}
            }
        }
        needs
    }

    fn stylesheets(&self) -> Vec<&'static str> {
        let mut urls = vec![LEAFLET_CSS];
        if self.icon_markers {
            urls.push(BOOTSTRAP_CSS);
            urls.push(AWESOME_MARKERS_CSS);
        }
        if self.cluster {
            urls.push(MARKERCLUSTER_CSS);
            urls.push(MARKERCLUSTER_DEFAULT_CSS);
        }
        if self.time_dimension {
            urls.push(TIMEDIMENSION_CSS);
        }
        if self.minimap {
            urls.push(MINIMAP_CSS);
        }
        if self.measure {
            urls.push(MEASURE_CSS);
        }
        if self.fullscreen {
            urls.push(FULLSCREEN_CSS);
        }
        if self.locate {
            urls.push(LOCATE_CSS);
        }
        if self.draw {
            urls.push(DRAW_CSS);
        }
        if self.search {
            urls.push(SEARCH_CSS);
        }
        urls
    }

    fn scripts(&self) -> Vec<&'static str> {
        let mut urls = vec![LEAFLET_JS];
        if self.icon_markers {
            urls.push(AWESOME_MARKERS_JS);
        }
        if self.cluster {
            urls.push(MARKERCLUSTER_JS);
        }
        if self.heat {
            urls.push(HEAT_JS);
        }
        if self.time_dimension {
            urls.push(ISO8601_JS);
            urls.push(TIMEDIMENSION_JS);
        }
        if self.minimap {
            urls.push(MINIMAP_JS);
        }
        if self.measure {
            urls.push(MEASURE_JS);
        }
        if self.fullscreen {
            urls.push(FULLSCREEN_JS);
        }
        if self.locate {
            urls.push(LOCATE_JS);
        }
        if self.draw {
            urls.push(DRAW_JS);
        }
        if self.search {
            urls.push(SEARCH_JS);
        }
        urls
    }
}

impl DocumentExporter {
    pub fn new(allow_empty: bool, default_attribution: impl Into<String>) -> Self {
        Self {
            allow_empty,
            default_attribution: default_attribution.into(),
        }
    }

    /// Export a resolved, framed document to a self-contained HTML artifact.
    pub fn export(&self, document: &ResolvedDocument) -> Result<Artifact, ExportError> {
        let Some(viewport) = document.viewport() else {
            return Err(ExportError::UnresolvedDocument(document.id().to_string()));
        };
        if !self.allow_empty && !document.has_overlays() {
            return Err(ExportError::EmptyDocument(document.id().to_string()));
        }

        let needs = PluginNeeds::scan(document);
        let mut output = String::new();

        write_html_header(&mut output, document.title(), &needs);

        output.push_str("<body>\n");
        output.push_str("<div id=\"map\"></div>\n");
        for url in needs.scripts() {
            output.push_str(&format!("<script src=\"{}\"></script>\n", url));
        }
        output.push_str("<script>\n");

        write_map_init(&mut output, document, viewport);

        // Base layers and overlays accumulate in insertion order so a
        // layer toggle sees exactly the layers declared before it.
        let mut bases: Vec<(String, String)> = Vec::new();
        let mut overlays: Vec<(String, String)> = Vec::new();

        for (index, named) in document.layers().iter().enumerate() {
            let var = js_var(&named.name, index);
            match &named.layer {
                Layer::Basemap { tiles, attribution } => {
                    self.write_basemap(&mut output, &var, tiles, attribution.as_deref());
                    bases.push((named.name.clone(), var));
                }
                Layer::Marker(marker) => {
                    write_marker(&mut output, &var, marker);
                    output.push_str(&format!("{}.addTo(map);\n", var));
                    overlays.push((named.name.clone(), var));
                }
                Layer::MarkerCollection(collection) => {
                    write_marker_collection(&mut output, &var, collection);
                    overlays.push((named.name.clone(), var));
                }
                Layer::Heat(heat) => {
                    write_heat(&mut output, &var, heat);
                    overlays.push((named.name.clone(), var));
                }
                Layer::Shape(shape) => {
                    write_shape(&mut output, &var, shape);
                    overlays.push((named.name.clone(), var));
                }
                Layer::FeatureCollection(collection) => {
                    write_feature_collection(&mut output, &var, collection)?;
                    overlays.push((named.name.clone(), var));
                }
                Layer::TimeAnimated(collection) => {
                    write_time_animated(&mut output, &var, collection)?;
                    overlays.push((named.name.clone(), var));
                }
                Layer::Control(kind) => {
                    write_control(&mut output, &var, kind, document, &bases, &overlays);
                }
            }
        }

        output.push_str("</script>\n");
        output.push_str("</body>\n");
        output.push_str("</html>\n");

        debug!(
            "exported document '{}' ({} layers, {} bytes)",
            document.id(),
            document.layers().len(),
            output.len()
        );

        Ok(Artifact::new(document.id(), output.into_bytes()))
    }

    /// Build the navigation index over a set of artifacts.
    pub fn export_index(&self, artifacts: &[Artifact]) -> Artifact {
        let ids: Vec<String> = artifacts.iter().map(|a| a.id.clone()).collect();
        self.export_index_from_ids(&ids)
    }

    /// Build the navigation index from artifact identifiers alone, for
    /// regenerating the page over an existing output directory.
    pub fn export_index_from_ids(&self, ids: &[String]) -> Artifact {
        let mut output = String::new();
        output.push_str("<!DOCTYPE html>\n");
        output.push_str("<html lang=\"en\">\n");
        output.push_str("<head>\n");
        output.push_str("<meta charset=\"UTF-8\">\n");
        output.push_str("<title>Map index</title>\n");
        output.push_str("<style>\n");
        output.push_str(INDEX_CSS);
        output.push_str("</style>\n");
        output.push_str("</head>\n");
        output.push_str("<body>\n");
        output.push_str("<h1>Map index</h1>\n");
        output.push_str("<ul>\n");
        for id in ids.iter().filter(|id| id.as_str() != "index").sorted() {
            output.push_str(&format!(
                "<li><a href=\"{}.html\">{}</a></li>\n",
                escape_html(id),
                escape_html(id)
            ));
        }
        output.push_str("</ul>\n");
        output.push_str("</body>\n");
        output.push_str("</html>\n");
        Artifact::new("index", output.into_bytes())
    }

    fn write_basemap(
        &self,
        output: &mut String,
        var: &str,
        tiles: &TileSource,
        attribution: Option<&str>,
    ) {
        let attribution = match (attribution, tiles) {
            (Some(text), _) => text.to_string(),
            (None, TileSource::Named(provider)) => provider.default_attribution().to_string(),
            (None, TileSource::UrlTemplate { .. }) => self.default_attribution.clone(),
        };
        output.push_str(&format!(
            "var {} = L.tileLayer({}, {{attribution: {}}}).addTo(map);\n",
            var,
            js_str(tiles.url_template()),
            js_str(&attribution)
        ));
    }
}

/// Write HTML header with stylesheet links and inline CSS
fn write_html_header(output: &mut String, title: &str, needs: &PluginNeeds) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    for url in needs.stylesheets() {
        output.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", url));
    }
    output.push_str("<style>\n");
    output.push_str(CSS_STYLES);
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

/// Write the map constructor and initial framing
fn write_map_init(output: &mut String, document: &ResolvedDocument, viewport: &Viewport) {
    let mut options: Vec<String> = Vec::new();
    if document.no_basemap() {
        options.push("crs: L.CRS.Simple".to_string());
    }
    if let Some(timeline) = first_timeline(document) {
        options.push("timeDimension: true".to_string());
        options.push(format!(
            "timeDimensionOptions: {{period: {}}}",
            js_str(&timeline.period)
        ));
        options.push("timeDimensionControl: true".to_string());
        options.push(format!(
            "timeDimensionControlOptions: {{autoPlay: {}, loopButton: {}, maxSpeed: {}}}",
            timeline.auto_play, timeline.loop_playback, timeline.max_speed
        ));
    }
    output.push_str(&format!(
        "var map = L.map(\"map\", {{{}}});\n",
        options.join(", ")
    ));

    match viewport {
        Viewport::CenterZoom { center, zoom } => {
            output.push_str(&format!(
                "map.setView([{}, {}], {});\n",
                center.lat, center.lon, zoom
            ));
        }
        Viewport::Bounds(bbox) => {
            output.push_str(&format!(
                "map.fitBounds([[{}, {}], [{}, {}]]);\n",
                bbox.south, bbox.west, bbox.north, bbox.east
            ));
        }
    }
}

fn first_timeline(document: &ResolvedDocument) -> Option<&TimeAnimatedCollection> {
    document
        .layers()
        .iter()
        .find_map(|named| match &named.layer {
            Layer::TimeAnimated(collection) => Some(collection),
            _ => None,
        })
}

/// Write a single marker expression bound to `var`
fn write_marker(output: &mut String, var: &str, marker: &PointMarker) {
    let mut options: Vec<String> = Vec::new();
    if let Some(label) = &marker.label {
        options.push(format!("title: {}", js_str(label)));
    }
    match &marker.style {
        Some(MarkerStyle::Icon { color, glyph }) => {
            options.push(format!(
                "icon: L.AwesomeMarkers.icon({{icon: {}, markerColor: {}, prefix: \"glyphicon\"}})",
                js_str(glyph),
                js_str(color)
            ));
        }
        Some(MarkerStyle::DivIcon { html }) => {
            options.push(format!("icon: L.divIcon({{html: {}}})", js_str(html)));
        }
        None => {}
    }
    output.push_str(&format!(
        "var {} = L.marker([{}, {}], {{{}}});\n",
        var,
        marker.coordinate.lat,
        marker.coordinate.lon,
        options.join(", ")
    ));
    if let Some(content) = &marker.content {
        output.push_str(&format!(
            "{}.bindPopup({});\n",
            var,
            js_str(&popup_html(content))
        ));
    }
    if let Some(label) = &marker.label {
        output.push_str(&format!("{}.bindTooltip({});\n", var, js_str(label)));
    }
}

/// Render popup content to the HTML embedded in the popup
fn popup_html(content: &PopupContent) -> String {
    match content {
        PopupContent::Html(html) => html.clone(),
        PopupContent::Frame {
            html,
            width,
            height,
        } => {
            // Sub-document travels as a base64 data URL so the artifact
            // stays a single file.
            let encoded = STANDARD.encode(html.as_bytes());
            format!(
                "<iframe src=\"data:text/html;charset=utf-8;base64,{}\" width=\"{}\" height=\"{}\" style=\"border:none;\"></iframe>",
                encoded, width, height
            )
        }
    }
}

fn write_marker_collection(output: &mut String, var: &str, collection: &MarkerCollection) {
    match collection.clustering {
        ClusterMode::None => {
            output.push_str(&format!("var {} = L.featureGroup();\n", var));
            for (i, marker) in collection.markers.iter().enumerate() {
                let member = format!("{}_m{}", var, i);
                write_marker(output, &member, marker);
                output.push_str(&format!("{}.addLayer({});\n", var, member));
            }
        }
        ClusterMode::Cluster => {
            output.push_str(&format!("var {} = L.markerClusterGroup();\n", var));
            for (i, marker) in collection.markers.iter().enumerate() {
                let member = format!("{}_m{}", var, i);
                write_marker(output, &member, marker);
                output.push_str(&format!("{}.addLayer({});\n", var, member));
            }
        }
        ClusterMode::FastCluster => {
            // Bulk form: one data literal, markers built in a loop, no
            // per-marker popups or styles.
            let rows = collection
                .markers
                .iter()
                .map(|m| {
                    format!(
                        "[{}, {}, {}]",
                        m.coordinate.lat,
                        m.coordinate.lon,
                        js_str(m.label.as_deref().unwrap_or(""))
                    )
                })
                .join(", ");
            output.push_str(&format!("var {}_data = [{}];\n", var, rows));
            output.push_str(&format!(
                "var {} = L.markerClusterGroup({{chunkedLoading: true}});\n",
                var
            ));
            output.push_str(&format!(
                "for (var i = 0; i < {var}_data.length; i++) {{\n    var row = {var}_data[i];\n    {var}.addLayer(L.marker([row[0], row[1]], {{title: row[2]}}));\n}}\n",
                var = var
            ));
        }
    }
    output.push_str(&format!("{}.addTo(map);\n", var));
}

fn write_heat(output: &mut String, var: &str, heat: &HeatLayer) {
    let rows = heat
        .points
        .iter()
        .map(|p| format!("[{}, {}, {}]", p.coordinate.lat, p.coordinate.lon, p.weight))
        .join(", ");
    output.push_str(&format!(
        "var {} = L.heatLayer([{}], {{radius: {}, blur: {}, minOpacity: {}}}).addTo(map);\n",
        var, rows, heat.radius, heat.blur, heat.min_opacity
    ));
}

fn write_shape(output: &mut String, var: &str, shape: &VectorShape) {
    let style = style_literal(&shape.style);
    match &shape.geometry {
        ShapeGeometry::Line(coords) => {
            output.push_str(&format!(
                "var {} = L.polyline([{}], {}).addTo(map);\n",
                var,
                latlng_rows(coords),
                style
            ));
        }
        ShapeGeometry::Polygon(coords) => {
            output.push_str(&format!(
                "var {} = L.polygon([{}], {}).addTo(map);\n",
                var,
                latlng_rows(coords),
                style
            ));
        }
        ShapeGeometry::Circle { center, radius_m } => {
            // L.circle wants the radius inside the options object.
            let style_with_radius = style_literal_with(&shape.style, Some(*radius_m));
            output.push_str(&format!(
                "var {} = L.circle([{}, {}], {}).addTo(map);\n",
                var, center.lat, center.lon, style_with_radius
            ));
        }
        ShapeGeometry::Rectangle(bbox) => {
            output.push_str(&format!(
                "var {} = L.rectangle([[{}, {}], [{}, {}]], {}).addTo(map);\n",
                var, bbox.south, bbox.west, bbox.north, bbox.east, style
            ));
        }
    }
    if let Some(tooltip) = &shape.tooltip {
        output.push_str(&format!("{}.bindTooltip({});\n", var, js_str(tooltip)));
    }
}

fn latlng_rows(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(|c| format!("[{}, {}]", c.lat, c.lon))
        .join(", ")
}

/// Leaflet path options for a style, as a JS object literal with sorted keys
fn style_literal(style: &VectorStyle) -> String {
    style_literal_with(style, None)
}

fn style_literal_with(style: &VectorStyle, radius_m: Option<f64>) -> String {
    let value = style_value(style, radius_m);
    // A Value map serializes with sorted keys, keeping bytes stable.
    serde_json::to_string(&value).unwrap_or_default()
}

fn style_value(style: &VectorStyle, radius_m: Option<f64>) -> Value {
    let mut map = Map::new();
    map.insert("color".to_string(), Value::from(style.color.clone()));
    map.insert("weight".to_string(), Value::from(style.weight));
    map.insert("opacity".to_string(), Value::from(style.opacity));
    map.insert("fill".to_string(), Value::from(style.fill));
    map.insert(
        "fillColor".to_string(),
        Value::from(style.fill_color.clone()),
    );
    map.insert("fillOpacity".to_string(), Value::from(style.fill_opacity));
    if let Some(radius) = radius_m {
        map.insert("radius".to_string(), Value::from(radius));
    }
    Value::Object(map)
}

fn write_feature_collection(
    output: &mut String,
    var: &str,
    collection: &FeatureCollection,
) -> Result<(), ExportError> {
    let mut features = Vec::with_capacity(collection.features.len());
    for feature in &collection.features {
        let mut properties = feature.properties.clone();
        if let Some(style_fn) = &collection.style {
            // Styles are evaluated here, once, and embedded; the artifact
            // carries data only.
            let style = style_fn.style_for(&feature.properties);
            properties.insert("__style".to_string(), style_value(&style, None));
        }
        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(feature.geometry.clone()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }
    let data = serde_json::to_string(&geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })?;

    output.push_str(&format!("var {}_data = {};\n", var, data));
    output.push_str(&format!("var {} = L.geoJson({}_data, {{\n", var, var));
    if collection.style.is_some() {
        output.push_str(
            "    style: function(feature) { return feature.properties[\"__style\"] || {}; },\n",
        );
    }
    if let Some(tooltip) = &collection.tooltip {
        write_tooltip_handler(output, tooltip)?;
    }
    output.push_str("}).addTo(map);\n");
    Ok(())
}

fn write_tooltip_handler(output: &mut String, tooltip: &FieldTooltip) -> Result<(), ExportError> {
    let fields = serde_json::to_string(&tooltip.fields)?;
    let aliases = match &tooltip.aliases {
        Some(aliases) => serde_json::to_string(aliases)?,
        None => fields.clone(),
    };
    output.push_str("    onEachFeature: function(feature, layer) {\n");
    output.push_str(&format!("        var fields = {};\n", fields));
    output.push_str(&format!("        var aliases = {};\n", aliases));
    output.push_str("        var parts = [];\n");
    output.push_str("        for (var i = 0; i < fields.length; i++) {\n");
    output.push_str(
        "            parts.push(\"<b>\" + aliases[i] + \"</b>: \" + feature.properties[fields[i]]);\n",
    );
    output.push_str("        }\n");
    output.push_str("        layer.bindTooltip(parts.join(\"<br>\"));\n");
    output.push_str("    },\n");
    Ok(())
}

fn write_time_animated(
    output: &mut String,
    var: &str,
    collection: &TimeAnimatedCollection,
) -> Result<(), ExportError> {
    let mut features = Vec::with_capacity(collection.records.len());
    for record in &collection.records {
        let mut properties = Map::new();
        properties.insert(
            "times".to_string(),
            Value::Array(vec![Value::from(
                record
                    .time
                    .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            )]),
        );
        if let Some(style) = &record.style {
            properties.insert("__style".to_string(), style_value(style, None));
        }
        if let Some(popup) = &record.popup {
            properties.insert("popup".to_string(), Value::from(popup.clone()));
        }
        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(record.geometry.clone()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }
    let data = serde_json::to_string(&geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })?;

    output.push_str(&format!("var {}_data = {};\n", var, data));
    output.push_str(&format!(
        "var {}_geojson = L.geoJson({}_data, {{\n",
        var, var
    ));
    output.push_str(
        "    style: function(feature) { return feature.properties[\"__style\"] || {}; },\n",
    );
    output.push_str("    onEachFeature: function(feature, layer) {\n");
    output.push_str("        if (feature.properties.popup) {\n");
    output.push_str("            layer.bindPopup(feature.properties.popup);\n");
    output.push_str("        }\n");
    output.push_str("    },\n");
    output.push_str("});\n");
    output.push_str(&format!(
        "var {var} = L.timeDimension.layer.geoJson({var}_geojson, {{updateTimeDimension: true, duration: {period}}}).addTo(map);\n",
        var = var,
        period = js_str(&collection.period)
    ));
    Ok(())
}

fn write_control(
    output: &mut String,
    var: &str,
    kind: &ControlKind,
    document: &ResolvedDocument,
    bases: &[(String, String)],
    overlays: &[(String, String)],
) {
    match kind {
        ControlKind::LayerToggle { collapsed } => {
            let bases_obj = toggle_entries(bases);
            let overlays_obj = toggle_entries(overlays);
            output.push_str(&format!(
                "L.control.layers({}, {}, {{collapsed: {}}}).addTo(map);\n",
                bases_obj, overlays_obj, collapsed
            ));
        }
        ControlKind::MiniMap => {
            output.push_str(&format!(
                "new L.Control.MiniMap(L.tileLayer({}), {{toggleDisplay: true}}).addTo(map);\n",
                js_str(crate::layer::TileProvider::OpenStreetMap.url_template())
            ));
        }
        ControlKind::Measure {
            primary_length_unit,
        } => {
            output.push_str(&format!(
                "new L.Control.Measure({{primaryLengthUnit: {}}}).addTo(map);\n",
                js_str(primary_length_unit)
            ));
        }
        ControlKind::Fullscreen => {
            output.push_str("L.control.fullscreen().addTo(map);\n");
        }
        ControlKind::Locate => {
            output.push_str("L.control.locate().addTo(map);\n");
        }
        ControlKind::Draw { export, filename } => {
            output.push_str(&format!(
                "var {}_items = new L.FeatureGroup().addTo(map);\n",
                var
            ));
            output.push_str(&format!(
                "map.addControl(new L.Control.Draw({{edit: {{featureGroup: {}_items}}}}));\n",
                var
            ));
            if *export {
                write_draw_export(output, var, filename);
            }
        }
        ControlKind::Search { target, key } => {
            // Resolution guarantees the target exists, so the lookup
            // here always finds it.
            let target_var = document
                .layers()
                .iter()
                .enumerate()
                .find(|(_, l)| &l.name == target)
                .map(|(i, l)| js_var(&l.name, i));
            if let Some(target_var) = target_var {
                output.push_str(&format!(
                    "new L.Control.Search({{layer: {}, propertyName: {}, initial: false}}).addTo(map);\n",
                    target_var,
                    js_str(key)
                ));
            }
        }
    }
}

fn toggle_entries(entries: &[(String, String)]) -> String {
    let body = entries
        .iter()
        .map(|(name, var)| format!("{}: {}", js_str(name), var))
        .join(", ");
    format!("{{{}}}", body)
}

fn write_draw_export(output: &mut String, var: &str, filename: &str) {
    output.push_str(&format!(
        "var {}_export = document.createElement(\"a\");\n",
        var
    ));
    output.push_str(&format!("{}_export.href = \"#\";\n", var));
    output.push_str(&format!("{}_export.className = \"draw-export\";\n", var));
    output.push_str(&format!("{}_export.innerHTML = \"Export\";\n", var));
    output.push_str(&format!(
        "{}_export.download = {};\n",
        var,
        js_str(filename)
    ));
    output.push_str(&format!("document.body.appendChild({}_export);\n", var));
    output.push_str(&format!("{}_export.onclick = function() {{\n", var));
    output.push_str(&format!(
        "    var data = JSON.stringify({}_items.toGeoJSON());\n",
        var
    ));
    output.push_str(&format!(
        "    {}_export.href = \"data:application/json;charset=utf-8,\" + encodeURIComponent(data);\n",
        var
    ));
    output.push_str("};\n");
}

/// Derive a unique, deterministic JS identifier for a layer
fn js_var(name: &str, index: usize) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("layer_{}_{}", index, sanitized)
}

/// Escape HTML special characters
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Quote a string as a JS string literal. `</` is broken up so embedded
/// markup can never terminate the surrounding script element.
fn js_str(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace("</", "<\\/");
    format!("\"{}\"", escaped)
}

const LEAFLET_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.js";
const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@3.4.1/dist/css/bootstrap.min.css";
const AWESOME_MARKERS_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css";
const AWESOME_MARKERS_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js";
const MARKERCLUSTER_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.markercluster/1.5.3/MarkerCluster.css";
const MARKERCLUSTER_DEFAULT_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.markercluster/1.5.3/MarkerCluster.Default.css";
const MARKERCLUSTER_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.markercluster/1.5.3/leaflet.markercluster.js";
const HEAT_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet.heat@0.2.0/dist/leaflet-heat.js";
const ISO8601_JS: &str = "https://cdn.jsdelivr.net/npm/iso8601-js-period@0.2.1/iso8601.min.js";
const TIMEDIMENSION_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet-timedimension@1.1.1/dist/leaflet.timedimension.control.css";
const TIMEDIMENSION_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet-timedimension@1.1.1/dist/leaflet.timedimension.min.js";
const MINIMAP_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet-minimap/3.6.1/Control.MiniMap.min.css";
const MINIMAP_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet-minimap/3.6.1/Control.MiniMap.min.js";
const MEASURE_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet-measure@3.1.0/dist/leaflet-measure.min.css";
const MEASURE_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet-measure@3.1.0/dist/leaflet-measure.min.js";
const FULLSCREEN_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.fullscreen/3.0.0/Control.FullScreen.min.css";
const FULLSCREEN_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet.fullscreen/3.0.0/Control.FullScreen.min.js";
const LOCATE_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.locatecontrol@0.79.0/dist/L.Control.Locate.min.css";
const LOCATE_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.locatecontrol@0.79.0/dist/L.Control.Locate.min.js";
const DRAW_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet.draw/1.0.4/leaflet.draw.css";
const DRAW_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet.draw/1.0.4/leaflet.draw.js";
const SEARCH_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet-search@3.0.9/dist/leaflet-search.min.css";
const SEARCH_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet-search@3.0.9/dist/leaflet-search.min.js";

/// Inline styles for the map page itself
const CSS_STYLES: &str = r#"
html, body {
    margin: 0;
    padding: 0;
    height: 100%;
}

#map {
    position: absolute;
    top: 0;
    bottom: 0;
    left: 0;
    right: 0;
}

.draw-export {
    position: absolute;
    top: 90px;
    left: 10px;
    z-index: 1000;
    background: white;
    padding: 6px 10px;
    border: 2px solid rgba(0, 0, 0, 0.2);
    border-radius: 4px;
    font-family: sans-serif;
    font-size: 13px;
    color: #333;
    text-decoration: none;
}
"#;

/// Styles for the navigation index page
const INDEX_CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto',
                 'Helvetica Neue', sans-serif;
    max-width: 700px;
    margin: 40px auto;
    padding: 0 20px;
    color: #333;
}

h1 {
    border-bottom: 2px solid #0066cc;
    padding-bottom: 8px;
}

ul {
    line-height: 1.9;
}

a {
    color: #0366d6;
    text-decoration: none;
}

a:hover {
    text-decoration: underline;
}
"#;
