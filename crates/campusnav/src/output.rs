//! The shared output region under the navigation controls.

use std::fmt;

use serde_json::Value;

use crate::api::types::{MstResult, PathResult};

pub const NO_BUILDING_EDGES: &str = "No direct building-to-building connections in MST.";

/// Summary of a found route. Numbers are the backend's, shown as sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub stops: Vec<String>,
    pub distance: f64,
    pub time: f64,
}

impl From<&PathResult> for RouteSummary {
    fn from(result: &PathResult) -> Self {
        Self {
            stops: result.path.clone(),
            distance: result.distance,
            time: result.time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeEdge {
    pub node1: String,
    pub node2: String,
    pub weight: f64,
}

/// Summary of a spanning tree: only the direct building edges are listed,
/// the totals come from the backend verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSummary {
    pub algorithm: String,
    pub building_edges: Vec<TreeEdge>,
    pub buildings_connected_directly: Option<String>,
    pub total_weight: f64,
    pub building_edges_weight: Option<f64>,
}

impl From<&MstResult> for TreeSummary {
    fn from(result: &MstResult) -> Self {
        Self {
            algorithm: result.algorithm.clone(),
            building_edges: result
                .edges
                .iter()
                .map(|e| TreeEdge {
                    node1: e.node1.clone(),
                    node2: e.node2.clone(),
                    weight: e.weight,
                })
                .collect(),
            buildings_connected_directly: result.buildings_connected_directly.as_ref().map(
                |v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            ),
            total_weight: result.total_weight,
            building_edges_weight: result.building_edges_weight,
        }
    }
}

/// How a line of output should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Body,
    Item,
    /// Distance and weight figures.
    Figure,
    /// Secondary figure, shown muted.
    Note,
    Error,
    Progress,
}

/// Whatever the output region currently shows. Writing replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OutputMessage {
    #[default]
    Idle,
    Progress(String),
    Error(String),
    Route(RouteSummary),
    Tree(TreeSummary),
}

impl OutputMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Styled lines for the UI and the terminal.
    pub fn lines(&self) -> Vec<(LineKind, String)> {
        match self {
            Self::Idle => Vec::new(),
            Self::Progress(text) => vec![(LineKind::Progress, text.clone())],
            Self::Error(text) => vec![(LineKind::Error, text.clone())],
            Self::Route(route) => vec![
                (LineKind::Heading, "Route Found!".to_string()),
                (LineKind::Body, format!("Path: {}", route.stops.join(" \u{2192} "))),
                (LineKind::Figure, format!("Distance: {} meters", route.distance)),
                (LineKind::Body, format!("Estimated time: {} minutes", route.time)),
            ],
            Self::Tree(tree) => tree_lines(tree),
        }
    }
}

fn tree_lines(tree: &TreeSummary) -> Vec<(LineKind, String)> {
    let mut lines = vec![(LineKind::Heading, "Minimum Spanning Tree".to_string())];
    if !tree.algorithm.is_empty() {
        lines.push((
            LineKind::Body,
            format!("Algorithm: {}", tree.algorithm.to_uppercase()),
        ));
    }

    if tree.building_edges.is_empty() {
        lines.push((LineKind::Body, NO_BUILDING_EDGES.to_string()));
        lines.push((
            LineKind::Figure,
            format!("Total MST Weight (with paths): {} meters", tree.total_weight),
        ));
        return lines;
    }

    for edge in &tree.building_edges {
        lines.push((
            LineKind::Item,
            format!("{} \u{2194} {} ({}m)", edge.node1, edge.node2, edge.weight),
        ));
    }
    if let Some(count) = &tree.buildings_connected_directly {
        lines.push((LineKind::Figure, format!("Direct Building Connections: {count}")));
    }
    lines.push((
        LineKind::Figure,
        format!("Total MST Weight: {} meters", tree.total_weight),
    ));
    if let Some(weight) = tree.building_edges_weight {
        lines.push((LineKind::Note, format!("Building Edges Weight: {weight}m")));
    }
    lines
}

impl fmt::Display for OutputMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.lines();
        for (i, (_, text)) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{text}")?;
        }
        Ok(())
    }
}

/// The single region every component reports into.
#[derive(Debug, Default)]
pub struct OutputRegion {
    message: OutputMessage,
}

impl OutputRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &OutputMessage {
        &self.message
    }

    pub fn set(&mut self, message: OutputMessage) {
        self.message = message;
    }

    pub fn progress(&mut self, text: impl Into<String>) {
        self.set(OutputMessage::Progress(text.into()));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(OutputMessage::Error(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(edges: Vec<(&str, &str, f64)>) -> TreeSummary {
        TreeSummary {
            algorithm: "kruskal".to_string(),
            building_edges: edges
                .into_iter()
                .map(|(a, b, w)| TreeEdge {
                    node1: a.to_string(),
                    node2: b.to_string(),
                    weight: w,
                })
                .collect(),
            buildings_connected_directly: None,
            total_weight: 120.0,
            building_edges_weight: Some(80.0),
        }
    }

    #[test]
    fn route_summary_lists_stops_in_order() {
        let msg = OutputMessage::Route(RouteSummary {
            stops: vec!["A".into(), "B".into(), "C".into()],
            distance: 80.0,
            time: 1.0,
        });
        let text = msg.to_string();
        assert!(text.contains("Path: A \u{2192} B \u{2192} C"));
        assert!(text.contains("Distance: 80 meters"));
        assert!(text.contains("Estimated time: 1 minutes"));
    }

    #[test]
    fn tree_totals_are_backend_figures() {
        // Listed edges sum to 25, the backend says 120 and 80.
        let msg = OutputMessage::Tree(tree(vec![("Gym", "Canteen", 10.0), ("Canteen", "Library", 15.0)]));
        let lines = msg.lines();
        assert!(lines.contains(&(LineKind::Figure, "Total MST Weight: 120 meters".to_string())));
        assert!(lines.contains(&(LineKind::Note, "Building Edges Weight: 80m".to_string())));
        assert!(lines.contains(&(LineKind::Item, "Gym \u{2194} Canteen (10m)".to_string())));
        assert!(lines.contains(&(LineKind::Body, "Algorithm: KRUSKAL".to_string())));
    }

    #[test]
    fn tree_without_building_edges() {
        let msg = OutputMessage::Tree(tree(Vec::new()));
        let text = msg.to_string();
        assert!(text.contains(NO_BUILDING_EDGES));
        assert!(text.contains("Total MST Weight (with paths): 120 meters"));
        assert!(!text.contains("Building Edges Weight"));
    }

    #[test]
    fn tree_summary_from_payload() {
        let mst: MstResult = serde_json::from_value(json!({
            "algorithm": "prim",
            "edges": [{"node1": "A", "node2": "B", "weight": 40}],
            "all_edges": [],
            "buildings_connected_directly": 2,
            "total_weight": 120,
            "building_edges_weight": 80
        }))
        .unwrap();
        let summary = TreeSummary::from(&mst);
        assert_eq!(summary.buildings_connected_directly.as_deref(), Some("2"));
        assert_eq!(summary.total_weight, 120.0);
        assert_eq!(summary.building_edges_weight, Some(80.0));
    }

    #[test]
    fn writing_replaces_previous_message() {
        let mut region = OutputRegion::new();
        region.progress("Finding path...");
        region.error("No path found");
        assert_eq!(region.message(), &OutputMessage::Error("No path found".into()));
        assert!(region.message().is_error());
    }
}
