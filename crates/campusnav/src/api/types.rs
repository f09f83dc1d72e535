//! Wire payloads of the campus navigation backend.
//!
//! Decoding is lenient where rendering can degrade per item (a malformed
//! coordinate drops that coordinate, not the whole response) and strict where
//! the summary depends on the value (distance, weights).

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NavError, Result};
use crate::geo::LonLat;

/// Building category as grouped by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Main,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub name: String,
    pub category: Category,
    pub coordinate: Option<LonLat>,
}

impl Building {
    fn named(name: String, category: Category) -> Self {
        Self {
            name,
            category,
            coordinate: None,
        }
    }
}

/// Canonical building list.
///
/// `/api/buildings` has been served both as a flat list and as
/// `{main: [...], others: [...]}`. Both decode into this shape; a flat list
/// becomes an ungrouped list of `Main` buildings.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingDirectory {
    pub buildings: Vec<Building>,
    pub grouped: bool,
}

impl BuildingDirectory {
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Building> {
        self.buildings
            .iter()
            .filter(move |b| b.category == category)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BuildingsPayload {
    Grouped {
        main: Vec<String>,
        #[serde(default)]
        others: Vec<String>,
    },
    Flat(Vec<String>),
}

impl<'de> Deserialize<'de> for BuildingDirectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match BuildingsPayload::deserialize(deserializer)? {
            BuildingsPayload::Grouped { main, others } => BuildingDirectory {
                buildings: main
                    .into_iter()
                    .map(|n| Building::named(n, Category::Main))
                    .chain(others.into_iter().map(|n| Building::named(n, Category::Other)))
                    .collect(),
                grouped: true,
            },
            BuildingsPayload::Flat(names) => BuildingDirectory {
                buildings: names
                    .into_iter()
                    .map(|n| Building::named(n, Category::Main))
                    .collect(),
                grouped: false,
            },
        })
    }
}

/// A graph edge between two buildings or intermediate nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub node1: String,
    pub node2: String,
    /// Meters.
    pub weight: f64,
    pub coord1: Option<LonLat>,
    pub coord2: Option<LonLat>,
    /// Road-following polyline, empty when the backend sent none.
    pub geometry: Vec<LonLat>,
    pub is_building_edge: bool,
}

/// How an edge can be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeGeometry<'a> {
    /// Multi-point road geometry.
    Road(&'a [LonLat]),
    /// Only the two endpoints are known.
    Straight { from: LonLat, to: LonLat },
    /// Nothing drawable.
    Missing,
}

impl Edge {
    pub fn geometry(&self) -> EdgeGeometry<'_> {
        if self.geometry.len() >= 2 {
            return EdgeGeometry::Road(&self.geometry);
        }
        match (self.coord1, self.coord2) {
            (Some(from), Some(to)) => EdgeGeometry::Straight { from, to },
            _ => EdgeGeometry::Missing,
        }
    }

    /// First coordinate along the edge: `coord1`, else the start of the road geometry.
    pub fn first_coordinate(&self) -> Option<LonLat> {
        self.coord1.or_else(|| self.geometry.first().copied())
    }

    /// Last coordinate along the edge: `coord2`, else the end of the road geometry.
    pub fn last_coordinate(&self) -> Option<LonLat> {
        self.coord2.or_else(|| self.geometry.last().copied())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeRepr {
    Object {
        #[serde(deserialize_with = "node_id")]
        node1: String,
        #[serde(deserialize_with = "node_id")]
        node2: String,
        #[serde(default)]
        weight: f64,
        #[serde(default, deserialize_with = "lenient_coord")]
        coord1: Option<LonLat>,
        #[serde(default, deserialize_with = "lenient_coord")]
        coord2: Option<LonLat>,
        #[serde(default, deserialize_with = "lenient_geometry")]
        geometry: Vec<LonLat>,
        #[serde(default)]
        is_building_edge: Option<bool>,
    },
    /// `[node1, node2, weight]`, as older backends emit MST edges.
    Tuple(String, String, f64),
}

impl<'de> Deserialize<'de> for Edge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match EdgeRepr::deserialize(deserializer)? {
            EdgeRepr::Object {
                node1,
                node2,
                weight,
                coord1,
                coord2,
                geometry,
                is_building_edge,
            } => Edge {
                node1,
                node2,
                weight,
                coord1,
                coord2,
                geometry,
                is_building_edge: is_building_edge.unwrap_or(false),
            },
            EdgeRepr::Tuple(node1, node2, weight) => Edge {
                node1,
                node2,
                weight,
                coord1: None,
                coord2: None,
                geometry: Vec::new(),
                is_building_edge: false,
            },
        })
    }
}

fn node_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn position_from_value(value: &Value) -> Option<LonLat> {
    let components: Option<Vec<f64>> = value.as_array()?.iter().map(Value::as_f64).collect();
    LonLat::from_position(&components?)
}

fn lenient_coord<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<LonLat>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(position_from_value))
}

/// Accepts a bare position list or a GeoJSON `LineString` object. Malformed
/// positions are dropped individually.
fn lenient_geometry<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<LonLat>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let positions = match &value {
        Some(Value::Array(points)) => points.as_slice(),
        Some(Value::Object(obj)) => match obj.get("coordinates") {
            Some(Value::Array(points)) => points.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    Ok(positions.iter().filter_map(position_from_value).collect())
}

/// Response of `POST /api/shortest-path`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathResult {
    pub path: Vec<String>,
    #[serde(default)]
    pub path_edges: Vec<Edge>,
    pub distance: f64,
    /// Minutes.
    pub time: f64,
}

/// Response of `GET /api/mst`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MstResult {
    #[serde(default)]
    pub algorithm: String,
    /// Direct building-to-building edges only.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Every tree edge, intermediate nodes included.
    #[serde(default)]
    pub all_edges: Vec<Edge>,
    #[serde(default)]
    pub buildings_connected_directly: Option<Value>,
    pub total_weight: f64,
    #[serde(default)]
    pub building_edges_weight: Option<f64>,
}

impl MstResult {
    /// Edges to draw on the map. Backends that predate `all_edges` only send `edges`.
    pub fn edges_to_render(&self) -> &[Edge] {
        if self.all_edges.is_empty() {
            &self.edges
        } else {
            &self.all_edges
        }
    }
}

/// Response of `GET /api/building-info/{name}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildingInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Body of `POST /api/shortest-path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPathQuery {
    pub source: String,
    pub destination: String,
}

/// The `error` field of a response, when present and truthy.
pub fn backend_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decode a response body, surfacing `{error}` payloads as [`NavError::Backend`].
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    if let Some(message) = backend_error(&value) {
        return Err(NavError::Backend(message));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grouped_buildings_keep_order_and_category() {
        let dir: BuildingDirectory = decode(json!({
            "main": ["Admin Building", "Main Library"],
            "others": ["Canteen"]
        }))
        .unwrap();
        assert!(dir.grouped);
        let main: Vec<_> = dir.in_category(Category::Main).map(|b| b.name.as_str()).collect();
        assert_eq!(main, vec!["Admin Building", "Main Library"]);
        let others: Vec<_> = dir.in_category(Category::Other).map(|b| b.name.as_str()).collect();
        assert_eq!(others, vec!["Canteen"]);
    }

    #[test]
    fn flat_buildings_are_ungrouped() {
        let dir: BuildingDirectory = decode(json!(["Gymnasium", "Canteen"])).unwrap();
        assert!(!dir.grouped);
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.buildings[0].name, "Gymnasium");
    }

    #[test]
    fn edge_object_with_coordinates() {
        let e: Edge = serde_json::from_value(json!({
            "node1": "A", "node2": "B", "weight": 50,
            "coord1": [125.1, 7.1], "coord2": [125.2, 7.2]
        }))
        .unwrap();
        assert_eq!(e.weight, 50.0);
        assert_eq!(
            e.geometry(),
            EdgeGeometry::Straight {
                from: LonLat::new(125.1, 7.1),
                to: LonLat::new(125.2, 7.2)
            }
        );
        assert!(!e.is_building_edge);
    }

    #[test]
    fn edge_with_road_geometry_prefers_road() {
        let e: Edge = serde_json::from_value(json!({
            "node1": "A", "node2": "P3", "weight": 12.5,
            "coord1": [125.1, 7.1], "coord2": [125.3, 7.3],
            "geometry": [[125.1, 7.1], [125.2, 7.15], [125.3, 7.3]],
            "is_building_edge": false
        }))
        .unwrap();
        match e.geometry() {
            EdgeGeometry::Road(points) => assert_eq!(points.len(), 3),
            other => panic!("expected road geometry, got {other:?}"),
        }
    }

    #[test]
    fn geometry_as_linestring_object() {
        let e: Edge = serde_json::from_value(json!({
            "node1": "A", "node2": "B", "weight": 1,
            "geometry": {"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}
        }))
        .unwrap();
        assert_eq!(e.geometry.len(), 2);
        assert_eq!(e.first_coordinate(), Some(LonLat::new(1.0, 2.0)));
        assert_eq!(e.last_coordinate(), Some(LonLat::new(3.0, 4.0)));
    }

    #[test]
    fn malformed_coordinate_degrades_to_missing() {
        let e: Edge = serde_json::from_value(json!({
            "node1": "A", "node2": 17, "weight": 3,
            "coord1": "nowhere", "coord2": [125.0]
        }))
        .unwrap();
        assert_eq!(e.node2, "17");
        assert_eq!(e.geometry(), EdgeGeometry::Missing);
    }

    #[test]
    fn tuple_edges_decode() {
        let mst: MstResult = decode(json!({
            "edges": [["Main Library", "CSM Building", 150]],
            "total_weight": 150
        }))
        .unwrap();
        assert_eq!(mst.edges[0].node2, "CSM Building");
        assert_eq!(mst.edges_to_render().len(), 1);
        assert!(mst.building_edges_weight.is_none());
    }

    #[test]
    fn error_payload_becomes_backend_error() {
        let err = decode::<PathResult>(json!({"error": "No path found"})).unwrap_err();
        assert!(matches!(err, NavError::Backend(ref m) if m == "No path found"));
    }

    #[test]
    fn empty_error_field_is_ignored() {
        let v = json!({"error": "", "name": "Gym", "details": {}});
        assert!(backend_error(&v).is_none());
        let info: BuildingInfo = decode(v).unwrap();
        assert_eq!(info.name, "Gym");
    }

    #[test]
    fn details_keep_backend_order() {
        let info: BuildingInfo = decode(json!({
            "name": "Gym",
            "details": {"zeta": "1", "alpha": "2", "mid": "3"}
        }))
        .unwrap();
        let keys: Vec<_> = info.details.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn query_serializes_expected_body() {
        let q = ShortestPathQuery {
            source: "A".into(),
            destination: "B".into(),
        };
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"source": "A", "destination": "B"})
        );
    }
}
