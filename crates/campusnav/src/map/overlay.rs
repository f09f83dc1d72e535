//! Route and spanning-tree overlays.
//!
//! Two slots, `path` and `mst`, each hold at most one layer group on the map.
//! The two visualizations are mutually exclusive: installing either one
//! removes whatever occupies both slots, in the same `&mut` step that adds the
//! new group, so no caller ever sees a half-cleared state.

use std::fmt;

use eframe::egui::Color32;

use crate::api::types::{Edge, EdgeGeometry};
use crate::geo::{LatLng, LonLat};

use super::{LayerGroup, LayerId, LineStyle, Map, Marker, MarkerKind, Polyline, Popup, Shape};

/// Screen padding kept around a fitted route.
pub const FIT_PADDING: f64 = 50.0;

pub const PATH_STYLE: LineStyle = LineStyle::solid(Color32::from_rgb(0x34, 0x98, 0xDB), 5.0, 0.8);
/// Direct building-to-building tree edges.
pub const MST_BUILDING_STYLE: LineStyle =
    LineStyle::dashed(Color32::from_rgb(0xE7, 0x4C, 0x3C), 4.0, 0.8, [5.0, 5.0]);
/// Tree edges through intermediate nodes.
pub const MST_INTERMEDIATE_STYLE: LineStyle =
    LineStyle::dashed(Color32::from_rgb(0xE6, 0x7E, 0x22), 2.0, 0.8, [3.0, 3.0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlaySlot {
    Path,
    Mst,
}

impl OverlaySlot {
    pub const ALL: [OverlaySlot; 2] = [OverlaySlot::Path, OverlaySlot::Mst];

    pub fn name(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Mst => "mst",
        }
    }
}

impl fmt::Display for OverlaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owns the `path` and `mst` slots.
#[derive(Debug, Default)]
pub struct RouteOverlayManager {
    path: Option<LayerId>,
    mst: Option<LayerId>,
}

impl RouteOverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn slot(&self, slot: OverlaySlot) -> Option<LayerId> {
        match slot {
            OverlaySlot::Path => self.path,
            OverlaySlot::Mst => self.mst,
        }
    }

    fn slot_mut(&mut self, slot: OverlaySlot) -> &mut Option<LayerId> {
        match slot {
            OverlaySlot::Path => &mut self.path,
            OverlaySlot::Mst => &mut self.mst,
        }
    }

    /// Remove the slot's group from the map and drop the handle. No-op when empty.
    pub fn clear(&mut self, map: &mut Map, slot: OverlaySlot) {
        if let Some(id) = self.slot_mut(slot).take() {
            map.remove_layer(id);
            tracing::debug!("cleared {slot} overlay");
        }
    }

    pub fn clear_all(&mut self, map: &mut Map) {
        for slot in OverlaySlot::ALL {
            self.clear(map, slot);
        }
    }

    /// The only way a group enters a slot.
    fn install(&mut self, map: &mut Map, slot: OverlaySlot, group: LayerGroup) -> LayerId {
        self.clear_all(map);
        let id = map.add_layer(group);
        *self.slot_mut(slot) = Some(id);
        id
    }

    /// Draw a route: one line per drawable edge plus start and end markers,
    /// then fit the view to it.
    pub fn render_path(
        &mut self,
        map: &mut Map,
        edges: &[Edge],
        source_label: &str,
        dest_label: &str,
    ) -> LayerId {
        let mut group = LayerGroup::new(OverlaySlot::Path.name());

        for edge in edges {
            if let Some(points) = edge_points(edge) {
                group.push(Shape::Polyline(Polyline {
                    points,
                    style: PATH_STYLE,
                    popup: Some(edge_popup(edge)),
                }));
            }
        }

        if let Some(start) = edges.first().and_then(Edge::first_coordinate) {
            group.push(endpoint_marker(start, MarkerKind::Start, format!("Start: {source_label}")));
        }
        if let Some(end) = edges.last().and_then(Edge::last_coordinate) {
            group.push(endpoint_marker(end, MarkerKind::End, format!("End: {dest_label}")));
        }

        let bounds = group.bounds();
        let id = self.install(map, OverlaySlot::Path, group);
        match bounds {
            Some(bounds) => map.viewport.fit_bounds(bounds, FIT_PADDING),
            None => tracing::debug!("path overlay has no coordinates, keeping view"),
        }
        id
    }

    /// Draw every tree edge, road-following where geometry is available.
    /// Edges without coordinates are skipped.
    pub fn render_mst(&mut self, map: &mut Map, all_edges: &[Edge]) -> LayerId {
        let mut group = LayerGroup::new(OverlaySlot::Mst.name());
        let mut skipped = 0usize;

        for edge in all_edges {
            let Some(points) = edge_points(edge) else {
                skipped += 1;
                continue;
            };
            let style = if edge.is_building_edge {
                MST_BUILDING_STYLE
            } else {
                MST_INTERMEDIATE_STYLE
            };
            group.push(Shape::Polyline(Polyline {
                points,
                style,
                popup: Some(edge_popup(edge)),
            }));
        }

        if skipped > 0 {
            tracing::debug!("{skipped} tree edge(s) without coordinates skipped");
        }
        self.install(map, OverlaySlot::Mst, group)
    }
}

/// Render-order points of an edge, or `None` when it cannot be drawn.
fn edge_points(edge: &Edge) -> Option<Vec<LatLng>> {
    match edge.geometry() {
        EdgeGeometry::Road(points) => Some(points.iter().map(|p| p.to_lat_lng()).collect()),
        EdgeGeometry::Straight { from, to } => Some(vec![from.to_lat_lng(), to.to_lat_lng()]),
        EdgeGeometry::Missing => None,
    }
}

fn edge_popup(edge: &Edge) -> String {
    format!("{} \u{2194} {} ({}m)", edge.node1, edge.node2, edge.weight)
}

fn endpoint_marker(at: LonLat, kind: MarkerKind, label: String) -> Shape {
    Shape::Marker(Marker {
        position: at.to_lat_lng(),
        kind,
        building: None,
        popup: Popup::closed(label),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Map {
        Map::new(LatLng::new(7.0851, 125.4790), 15.0)
    }

    fn edge(a: &str, b: &str, w: f64, c1: Option<[f64; 2]>, c2: Option<[f64; 2]>) -> Edge {
        Edge {
            node1: a.to_string(),
            node2: b.to_string(),
            weight: w,
            coord1: c1.map(|c| LonLat::new(c[0], c[1])),
            coord2: c2.map(|c| LonLat::new(c[0], c[1])),
            geometry: Vec::new(),
            is_building_edge: false,
        }
    }

    const A: [f64; 2] = [125.4790, 7.0851];
    const B: [f64; 2] = [125.4800, 7.0860];
    const C: [f64; 2] = [125.4815, 7.0872];

    #[test]
    fn clear_empty_slot_is_noop() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        overlays.clear(&mut m, OverlaySlot::Path);
        assert_eq!(m.layer_count(), 0);
        assert!(overlays.slot(OverlaySlot::Path).is_none());
    }

    #[test]
    fn path_shapes_are_swapped_to_lat_lng() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let id = overlays.render_path(&mut m, &[edge("A", "B", 50.0, Some(A), Some(B))], "A", "B");
        let group = m.layer(id).unwrap();
        let line = group.polylines().next().unwrap();
        assert_eq!(line.points, vec![LatLng::new(A[1], A[0]), LatLng::new(B[1], B[0])]);
    }

    #[test]
    fn render_path_fits_view() {
        let mut m = map();
        m.viewport.zoom = 3.0;
        let mut overlays = RouteOverlayManager::new();
        overlays.render_path(
            &mut m,
            &[edge("A", "B", 50.0, Some(A), Some(B)), edge("B", "C", 30.0, Some(B), Some(C))],
            "A",
            "C",
        );
        assert!(m.viewport.zoom > 3.0);
        let expected = crate::geo::Bounds::from_points([
            LatLng::new(A[1], A[0]),
            LatLng::new(C[1], C[0]),
        ])
        .unwrap();
        assert!(expected.contains(m.viewport.center));
    }

    #[test]
    fn path_without_coordinates_keeps_view() {
        let mut m = map();
        let before = m.viewport;
        let mut overlays = RouteOverlayManager::new();
        let id = overlays.render_path(&mut m, &[edge("A", "B", 50.0, None, None)], "A", "B");
        assert_eq!(m.viewport, before);
        assert!(m.layer(id).unwrap().is_empty());
        assert_eq!(overlays.slot(OverlaySlot::Path), Some(id));
    }

    #[test]
    fn missing_start_coordinate_drops_only_start_marker() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let id = overlays.render_path(&mut m, &[edge("A", "B", 50.0, None, Some(B))], "A", "B");
        let kinds: Vec<_> = m.layer(id).unwrap().markers().map(|(_, mk)| mk.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::End]);
    }

    #[test]
    fn mst_styles_distinguish_building_edges() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let mut direct = edge("Gym", "Canteen", 90.0, Some(A), Some(B));
        direct.is_building_edge = true;
        let via = edge("Canteen", "P4", 20.0, Some(B), Some(C));
        let id = overlays.render_mst(&mut m, &[direct, via]);

        let styles: Vec<_> = m.layer(id).unwrap().polylines().map(|l| l.style).collect();
        assert_eq!(styles, vec![MST_BUILDING_STYLE, MST_INTERMEDIATE_STYLE]);
        assert_ne!(MST_BUILDING_STYLE.color, MST_INTERMEDIATE_STYLE.color);
        assert!(MST_BUILDING_STYLE.weight > MST_INTERMEDIATE_STYLE.weight);
    }

    #[test]
    fn mst_road_geometry_is_followed() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let mut road = edge("A", "C", 70.0, Some(A), Some(C));
        road.geometry = vec![
            LonLat::new(A[0], A[1]),
            LonLat::new(B[0], B[1]),
            LonLat::new(C[0], C[1]),
        ];
        let id = overlays.render_mst(&mut m, &[road]);
        let line = m.layer(id).unwrap().polylines().next().unwrap();
        assert_eq!(line.points.len(), 3);
        assert_eq!(line.points[1], LatLng::new(B[1], B[0]));
    }

    #[test]
    fn mst_skips_edges_without_coordinates() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let id = overlays.render_mst(
            &mut m,
            &[
                edge("A", "B", 10.0, None, None),
                edge("B", "C", 20.0, Some(B), Some(C)),
                edge("C", "D", 30.0, Some(C), None),
            ],
        );
        let lines: Vec<_> = m.layer(id).unwrap().polylines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].popup.as_deref(), Some("B \u{2194} C (20m)"));
    }

    #[test]
    fn mst_keeps_backend_order_and_duplicates() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let e1 = edge("B", "C", 20.0, Some(B), Some(C));
        let e2 = edge("A", "B", 10.0, Some(A), Some(B));
        let id = overlays.render_mst(&mut m, &[e1.clone(), e2, e1]);
        let popups: Vec<_> = m
            .layer(id)
            .unwrap()
            .polylines()
            .map(|l| l.popup.clone().unwrap())
            .collect();
        assert_eq!(
            popups,
            vec!["B \u{2194} C (20m)", "A \u{2194} B (10m)", "B \u{2194} C (20m)"]
        );
    }

    #[test]
    fn rerender_replaces_previous_generation() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let first = overlays.render_mst(&mut m, &[edge("A", "B", 1.0, Some(A), Some(B))]);
        let second = overlays.render_mst(&mut m, &[edge("B", "C", 1.0, Some(B), Some(C))]);
        assert_ne!(first, second);
        assert!(m.layer(first).is_none());
        assert_eq!(m.layer_count(), 1);
        assert_eq!(overlays.slot(OverlaySlot::Mst), Some(second));
    }

    #[test]
    fn slots_are_mutually_exclusive() {
        let mut m = map();
        let mut overlays = RouteOverlayManager::new();
        let path_edges = [edge("A", "B", 50.0, Some(A), Some(B))];

        overlays.render_path(&mut m, &path_edges, "A", "B");
        overlays.render_mst(&mut m, &path_edges);
        assert!(overlays.slot(OverlaySlot::Path).is_none());
        assert!(overlays.slot(OverlaySlot::Mst).is_some());
        assert_eq!(m.layer_count(), 1);

        overlays.render_path(&mut m, &path_edges, "A", "B");
        assert!(overlays.slot(OverlaySlot::Mst).is_none());
        assert!(overlays.slot(OverlaySlot::Path).is_some());
        assert_eq!(m.layer_count(), 1);
    }

    #[test]
    fn clearing_leaves_other_layers_alone() {
        let mut m = map();
        let campus = m.add_layer(LayerGroup::new("campus"));
        let mut overlays = RouteOverlayManager::new();
        overlays.render_path(&mut m, &[edge("A", "B", 50.0, Some(A), Some(B))], "A", "B");
        overlays.clear_all(&mut m);
        assert_eq!(m.layer_count(), 1);
        assert!(m.layer(campus).is_some());
    }
}
