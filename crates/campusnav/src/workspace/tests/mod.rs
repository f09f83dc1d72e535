mod navigation;

use serde_json::{Value, json};

use super::{CampusMap, MapSettings};
use crate::api::{ApiRequest, ApiResponse, Completion, RecordingSink, Ticket};
use crate::error::NavError;
use crate::geo::LatLng;
use crate::map::{MarkerRef, TileLayer};

const A: [f64; 2] = [125.4790, 7.0851];
const B: [f64; 2] = [125.4800, 7.0860];
const C: [f64; 2] = [125.4815, 7.0872];

/// Helper to create the default settings.
fn settings() -> MapSettings {
    MapSettings {
        center: LatLng::new(7.0851, 125.4790),
        zoom: 15.0,
        tiles: TileLayer {
            url_template: "https://tile.example/{z}/{x}/{y}.png".to_string(),
            attribution: "© contributors".to_string(),
        },
    }
}

/// Helper to create a started workspace with its startup requests answered:
/// two named campus markers plus the grouped building list.
fn started() -> (CampusMap, RecordingSink) {
    let mut ws = CampusMap::new(settings());
    let mut sink = RecordingSink::default();
    ws.start(&mut sink);

    for (ticket, request) in sink.take() {
        let response = match request {
            ApiRequest::CampusGeometry => ApiResponse::CampusGeometry(
                serde_json::from_value(json!({
                    "type": "FeatureCollection",
                    "features": [
                        {"type": "Feature", "properties": {"Name": "Gymnasium"},
                         "geometry": {"type": "Point", "coordinates": A}},
                        {"type": "Feature", "properties": {"Name": "Canteen"},
                         "geometry": {"type": "Point", "coordinates": C}}
                    ]
                }))
                .unwrap(),
            ),
            ApiRequest::Buildings => ApiResponse::Buildings(
                serde_json::from_value(json!({
                    "main": ["Gymnasium", "Main Library"],
                    "others": ["Canteen"]
                }))
                .unwrap(),
            ),
            other => panic!("unexpected startup request {other:?}"),
        };
        ws.handle(ok(ticket, response));
    }
    (ws, sink)
}

/// Helper to build a successful completion.
fn ok(ticket: Ticket, response: ApiResponse) -> Completion {
    Completion {
        ticket,
        result: Ok(response),
    }
}

/// Helper to build a failed completion.
fn failed(ticket: Ticket, error: NavError) -> Completion {
    Completion {
        ticket,
        result: Err(error),
    }
}

/// Helper to build a path response from JSON.
fn path_response(value: Value) -> ApiResponse {
    ApiResponse::Path(serde_json::from_value(value).unwrap())
}

/// Helper to build an MST response from JSON.
fn mst_response(value: Value) -> ApiResponse {
    ApiResponse::Mst(serde_json::from_value(value).unwrap())
}

/// The two-edge route A -> B -> C.
fn route_abc() -> ApiResponse {
    path_response(json!({
        "path": ["A", "B", "C"],
        "path_edges": [
            {"node1": "A", "node2": "B", "weight": 50, "coord1": A, "coord2": B},
            {"node1": "B", "node2": "C", "weight": 30, "coord1": B, "coord2": C}
        ],
        "distance": 80,
        "time": 1
    }))
}

fn tree() -> ApiResponse {
    mst_response(json!({
        "algorithm": "kruskal",
        "edges": [
            {"node1": "Gymnasium", "node2": "Canteen", "weight": 10, "is_building_edge": true}
        ],
        "all_edges": [
            {"node1": "Gymnasium", "node2": "Canteen", "weight": 10,
             "coord1": A, "coord2": C, "is_building_edge": true},
            {"node1": "Canteen", "node2": "P1", "weight": 15,
             "coord1": C, "coord2": B, "is_building_edge": false}
        ],
        "buildings_connected_directly": 1,
        "total_weight": 120,
        "building_edges_weight": 80
    }))
}

/// Marker of the named campus feature.
fn marker_for(ws: &CampusMap, building: &str) -> MarkerRef {
    ws.map
        .map()
        .unwrap()
        .markers()
        .find(|(_, m)| m.building.as_deref() == Some(building))
        .map(|(r, _)| r)
        .unwrap()
}

/// The only submitted request, with its ticket.
fn single(sink: &mut RecordingSink) -> (Ticket, ApiRequest) {
    let mut submitted = sink.take();
    assert_eq!(submitted.len(), 1, "expected one request, got {submitted:?}");
    submitted.remove(0)
}
