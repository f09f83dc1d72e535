use super::*;
use crate::map::overlay::OverlaySlot;
use crate::navigation::{FINDING_PATH, GENERATING_MST, RouteRejection};
use crate::output::{LineKind, OutputMessage};

#[test]
fn startup_fills_selectors_and_campus_layer() {
    let (ws, _) = started();
    assert!(ws.map.boundary_layer().is_some());
    assert_eq!(ws.catalog.source.groups().len(), 2);
    assert_eq!(ws.catalog.source.groups(), ws.catalog.destination.groups());
    assert_eq!(ws.output.message(), &OutputMessage::Idle);
}

#[test]
fn missing_selection_makes_no_request() {
    let (mut ws, mut sink) = started();
    ws.catalog.source.select("Gymnasium");

    assert_eq!(ws.find_path(&mut sink), Err(RouteRejection::MissingSelection));
    assert!(sink.take().is_empty());
    assert_eq!(
        ws.output.message(),
        &OutputMessage::Error("Please select both starting point and destination.".into())
    );
}

#[test]
fn same_selection_makes_no_request() {
    let (mut ws, mut sink) = started();
    ws.catalog.source.select("Canteen");
    ws.catalog.destination.select("Canteen");

    assert_eq!(ws.find_path(&mut sink), Err(RouteRejection::SameSelection));
    assert!(sink.take().is_empty());
    assert!(ws.output.message().is_error());
}

#[test]
fn path_request_shows_progress_then_summary() {
    let (mut ws, mut sink) = started();
    ws.catalog.source.select("Gymnasium");
    ws.catalog.destination.select("Canteen");

    ws.find_path(&mut sink).unwrap();
    let (ticket, request) = single(&mut sink);
    assert_eq!(
        request,
        ApiRequest::ShortestPath {
            source: "Gymnasium".into(),
            destination: "Canteen".into()
        }
    );
    assert_eq!(ws.output.message(), &OutputMessage::Progress(FINDING_PATH.into()));

    ws.handle(ok(ticket, route_abc()));
    let lines = ws.output.message().lines();
    assert!(lines.contains(&(LineKind::Figure, "Distance: 80 meters".to_string())));
    assert!(lines.contains(&(LineKind::Body, "Path: A \u{2192} B \u{2192} C".to_string())));
    assert!(!ws.navigation.is_pending());
}

#[test]
fn route_distance_comes_from_backend() {
    let (mut ws, mut sink) = started();
    let ticket = ws.request_path("Gymnasium", "Canteen", &mut sink).unwrap();
    sink.take();

    // Edge weights add up to 80; the reported distance wins.
    ws.handle(ok(
        ticket,
        path_response(json!({
            "path": ["A", "B", "C"],
            "path_edges": [
                {"node1": "A", "node2": "B", "weight": 50, "coord1": A, "coord2": B},
                {"node1": "B", "node2": "C", "weight": 30, "coord1": B, "coord2": C}
            ],
            "distance": 95,
            "time": 1
        })),
    ));

    let lines = ws.output.message().lines();
    assert!(lines.contains(&(LineKind::Figure, "Distance: 95 meters".to_string())));
    assert!(!lines.iter().any(|(_, text)| text.contains("80")));
}

#[test]
fn backend_error_text_is_shown_verbatim() {
    let (mut ws, mut sink) = started();
    let ticket = ws.request_path("Gymnasium", "Canteen", &mut sink).unwrap();
    sink.take();

    ws.handle(failed(ticket, NavError::Backend("No path found".into())));
    assert_eq!(ws.output.message(), &OutputMessage::Error("No path found".into()));
    assert!(ws.overlays.slot(OverlaySlot::Path).is_none());
}

#[test]
fn transport_error_is_prefixed() {
    let (mut ws, mut sink) = started();
    let ticket = ws.show_mst(&mut sink);
    sink.take();

    ws.handle(failed(
        ticket,
        NavError::Status {
            status: 500,
            url: "http://127.0.0.1:5000/api/mst".into(),
        },
    ));
    match ws.output.message() {
        OutputMessage::Error(text) => assert!(text.starts_with("Error: ")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn stale_path_response_is_discarded() {
    let (mut ws, mut sink) = started();
    let first = ws.request_path("Gymnasium", "Canteen", &mut sink).unwrap();
    let second = ws.show_mst(&mut sink);
    sink.take();
    assert_eq!(ws.output.message(), &OutputMessage::Progress(GENERATING_MST.into()));

    // Second answer arrives first, then the superseded path result.
    ws.handle(ok(second, tree()));
    ws.handle(ok(first, route_abc()));

    assert!(matches!(ws.output.message(), OutputMessage::Tree(_)));
    assert!(ws.overlays.slot(OverlaySlot::Path).is_none());
    assert!(ws.overlays.slot(OverlaySlot::Mst).is_some());
}

#[test]
fn rejected_request_supersedes_in_flight_one() {
    let (mut ws, mut sink) = started();
    let first = ws.request_path("Gymnasium", "Canteen", &mut sink).unwrap();
    sink.take();
    assert!(ws.request_path("Gymnasium", "Gymnasium", &mut sink).is_err());

    ws.handle(ok(first, route_abc()));
    assert_eq!(
        ws.output.message(),
        &OutputMessage::Error("Starting point and destination cannot be the same.".into())
    );
    assert!(ws.overlays.slot(OverlaySlot::Path).is_none());
}

#[test]
fn tree_totals_come_from_backend() {
    let (mut ws, mut sink) = started();
    let ticket = ws.show_mst(&mut sink);
    assert_eq!(single(&mut sink).1, ApiRequest::Mst);

    ws.handle(ok(ticket, tree()));
    let lines = ws.output.message().lines();
    assert!(lines.contains(&(LineKind::Figure, "Total MST Weight: 120 meters".to_string())));
    assert!(lines.contains(&(LineKind::Note, "Building Edges Weight: 80m".to_string())));
    assert!(lines.contains(&(LineKind::Item, "Gymnasium \u{2194} Canteen (10m)".to_string())));
}

#[test]
fn catalog_failure_is_reported() {
    let mut ws = CampusMap::new(settings());
    let mut sink = RecordingSink::default();
    ws.start(&mut sink);
    for (ticket, request) in sink.take() {
        if request == ApiRequest::Buildings {
            ws.handle(failed(ticket, NavError::Backend("database offline".into())));
        }
    }
    assert_eq!(
        ws.output.message(),
        &OutputMessage::Error("Error loading buildings: database offline".into())
    );
    assert!(ws.catalog.source.groups().is_empty());
}

#[test]
fn start_twice_does_not_recreate_map() {
    let (mut ws, mut sink) = started();
    ws.start(&mut sink);
    let requests: Vec<_> = sink.take().into_iter().map(|(_, r)| r).collect();
    assert_eq!(requests, vec![ApiRequest::Buildings]);
    assert!(ws.map.boundary_layer().is_some());
}
