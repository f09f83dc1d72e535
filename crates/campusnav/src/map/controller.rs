use eframe::egui::Color32;
use geojson::{GeoJson, Geometry, Value as GeometryValue};

use crate::api::{ApiRequest, Origin, RequestSink, Sequencer};
use crate::error::Result;
use crate::geo::{LatLng, LonLat};

use super::{
    LayerGroup, LayerId, LineStyle, Map, Marker, MarkerKind, Polygon, Polyline, Popup, Shape,
    TileLayer,
};

/// Label of campus point features without a usable `Name`.
pub const UNNAMED_FEATURE: &str = "Unknown";

/// Uniform style of campus lines and polygons.
pub const CAMPUS_STYLE: LineStyle = LineStyle::solid(Color32::from_rgb(0x66, 0x7E, 0xEA), 3.0, 0.7);

/// Owns the single map instance and the static campus boundary layer.
#[derive(Debug, Default)]
pub struct MapController {
    map: Option<Map>,
    boundary: Option<LayerId>,
}

impl MapController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the map and request the campus geometry. Calling it again once
    /// the map exists does nothing and returns `false`.
    pub fn init(
        &mut self,
        center: LatLng,
        zoom: f64,
        tiles: TileLayer,
        sequencer: &mut Sequencer,
        sink: &mut dyn RequestSink,
    ) -> bool {
        if self.map.is_some() {
            tracing::debug!("map already initialized");
            return false;
        }

        let mut map = Map::new(center, zoom);
        map.set_tile_layer(tiles);
        self.map = Some(map);
        tracing::info!("map created at {center}, zoom {zoom}");

        sink.submit(sequencer.ticket(Origin::Boundary), ApiRequest::CampusGeometry);
        true
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut Map> {
        self.map.as_mut()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn boundary_layer(&self) -> Option<LayerId> {
        self.boundary
    }

    /// Render the campus feature collection. A failure is logged and the map
    /// stays usable without it.
    pub fn on_boundary_loaded(&mut self, result: Result<GeoJson>) {
        let geojson = match result {
            Ok(geojson) => geojson,
            Err(e) => {
                tracing::error!("Error loading map: {e}");
                return;
            }
        };
        let Some(map) = self.map.as_mut() else {
            tracing::warn!("campus geometry arrived before the map existed");
            return;
        };

        let group = campus_layer(&geojson);
        tracing::info!("campus layer loaded with {} shapes", group.shapes().len());
        if let Some(old) = self.boundary.take() {
            map.remove_layer(old);
        }
        self.boundary = Some(map.add_layer(group));
    }
}

/// Build the campus layer: named markers for points, uniformly styled lines
/// and polygons for everything else.
pub fn campus_layer(geojson: &GeoJson) -> LayerGroup {
    let mut group = LayerGroup::new("campus");
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in &collection.features {
                if let Some(geometry) = &feature.geometry {
                    let name = feature_name(feature.property("Name"));
                    push_geometry(&mut group, geometry, name.as_deref());
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                let name = feature_name(feature.property("Name"));
                push_geometry(&mut group, geometry, name.as_deref());
            }
        }
        GeoJson::Geometry(geometry) => push_geometry(&mut group, geometry, None),
    }
    group
}

/// A truthy `Name` property as text.
fn feature_name(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn to_lat_lngs(positions: &[Vec<f64>]) -> Vec<LatLng> {
    positions
        .iter()
        .filter_map(|p| LonLat::from_position(p))
        .map(LonLat::to_lat_lng)
        .collect()
}

fn push_point(group: &mut LayerGroup, position: &[f64], name: Option<&str>) {
    let Some(coord) = LonLat::from_position(position) else {
        return;
    };
    group.push(Shape::Marker(Marker {
        position: coord.to_lat_lng(),
        kind: MarkerKind::Place,
        building: name.map(str::to_string),
        popup: Popup::closed(name.unwrap_or(UNNAMED_FEATURE)),
    }));
}

fn push_line(group: &mut LayerGroup, positions: &[Vec<f64>]) {
    let points = to_lat_lngs(positions);
    if points.len() >= 2 {
        group.push(Shape::Polyline(Polyline {
            points,
            style: CAMPUS_STYLE,
            popup: None,
        }));
    }
}

fn push_polygon(group: &mut LayerGroup, rings: &[Vec<Vec<f64>>]) {
    let rings: Vec<Vec<LatLng>> = rings
        .iter()
        .map(|ring| to_lat_lngs(ring))
        .filter(|ring| ring.len() >= 3)
        .collect();
    if !rings.is_empty() {
        group.push(Shape::Polygon(Polygon {
            rings,
            style: CAMPUS_STYLE,
        }));
    }
}

fn push_geometry(group: &mut LayerGroup, geometry: &Geometry, name: Option<&str>) {
    match &geometry.value {
        GeometryValue::Point(p) => push_point(group, p, name),
        GeometryValue::MultiPoint(points) => {
            for p in points {
                push_point(group, p, name);
            }
        }
        GeometryValue::LineString(line) => push_line(group, line),
        GeometryValue::MultiLineString(lines) => {
            for line in lines {
                push_line(group, line);
            }
        }
        GeometryValue::Polygon(rings) => push_polygon(group, rings),
        GeometryValue::MultiPolygon(polygons) => {
            for rings in polygons {
                push_polygon(group, rings);
            }
        }
        GeometryValue::GeometryCollection(geometries) => {
            for g in geometries {
                push_geometry(group, g, name);
            }
        }
    }
}
