//! Path and spanning-tree requests.
//!
//! Path and tree results share the output region and the overlay slots, so
//! they share one lane: only the most recently issued navigation request may
//! touch the screen. Anything older is discarded when it completes.

use thiserror::Error;

use crate::api::{ApiRequest, ApiResponse, Origin, RequestSink, Sequencer, Ticket};
use crate::error::{NavError, Result};
use crate::map::Map;
use crate::map::overlay::RouteOverlayManager;
use crate::output::{OutputMessage, OutputRegion, RouteSummary, TreeSummary};

pub const FINDING_PATH: &str = "Finding path...";
pub const GENERATING_MST: &str = "Generating Minimum Spanning Tree...";

/// Why a path request was refused before reaching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteRejection {
    #[error("Please select both starting point and destination.")]
    MissingSelection,
    #[error("Starting point and destination cannot be the same.")]
    SameSelection,
}

pub fn validate_route(source: &str, destination: &str) -> std::result::Result<(), RouteRejection> {
    if source.trim().is_empty() || destination.trim().is_empty() {
        return Err(RouteRejection::MissingSelection);
    }
    if source == destination {
        return Err(RouteRejection::SameSelection);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Path {
        seq: u64,
        source: String,
        destination: String,
    },
    Mst {
        seq: u64,
    },
}

impl Pending {
    fn seq(&self) -> u64 {
        match self {
            Self::Path { seq, .. } | Self::Mst { seq } => *seq,
        }
    }
}

#[derive(Debug, Default)]
pub struct NavigationRequestCoordinator {
    pending: Option<Pending>,
}

impl NavigationRequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ask for the shortest path. Invalid input is reported to `output` and
    /// no request is made; either way earlier requests are superseded.
    pub fn request_path(
        &mut self,
        source: &str,
        destination: &str,
        sequencer: &mut Sequencer,
        sink: &mut dyn RequestSink,
        output: &mut OutputRegion,
    ) -> std::result::Result<Ticket, RouteRejection> {
        self.supersede();
        if let Err(rejection) = validate_route(source, destination) {
            output.error(rejection.to_string());
            return Err(rejection);
        }

        let ticket = sequencer.ticket(Origin::Navigation);
        self.pending = Some(Pending::Path {
            seq: ticket.seq,
            source: source.to_string(),
            destination: destination.to_string(),
        });
        output.progress(FINDING_PATH);
        sink.submit(
            ticket,
            ApiRequest::ShortestPath {
                source: source.to_string(),
                destination: destination.to_string(),
            },
        );
        Ok(ticket)
    }

    pub fn request_mst(
        &mut self,
        sequencer: &mut Sequencer,
        sink: &mut dyn RequestSink,
        output: &mut OutputRegion,
    ) -> Ticket {
        self.supersede();
        let ticket = sequencer.ticket(Origin::Navigation);
        self.pending = Some(Pending::Mst { seq: ticket.seq });
        output.progress(GENERATING_MST);
        sink.submit(ticket, ApiRequest::Mst);
        ticket
    }

    fn supersede(&mut self) {
        if let Some(old) = self.pending.take() {
            tracing::debug!(seq = old.seq(), "navigation request superseded");
        }
    }

    /// Apply a navigation completion if it answers the latest request.
    /// Returns whether anything on screen changed.
    pub fn on_completion(
        &mut self,
        ticket: Ticket,
        result: Result<ApiResponse>,
        map: Option<&mut Map>,
        overlays: &mut RouteOverlayManager,
        output: &mut OutputRegion,
    ) -> bool {
        let pending = match self.pending.take() {
            Some(p) if p.seq() == ticket.seq => p,
            other => {
                self.pending = other;
                tracing::debug!(seq = ticket.seq, "discarding stale navigation response");
                return false;
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(NavError::Backend(message)) => {
                output.error(message);
                return true;
            }
            Err(e) => {
                output.error(format!("Error: {e}"));
                return true;
            }
        };

        match (pending, response) {
            (
                Pending::Path {
                    source,
                    destination,
                    ..
                },
                ApiResponse::Path(path),
            ) => {
                match map {
                    Some(map) => {
                        overlays.render_path(map, &path.path_edges, &source, &destination);
                    }
                    None => tracing::warn!("route arrived before the map existed"),
                }
                output.set(OutputMessage::Route(RouteSummary::from(&path)));
            }
            (Pending::Mst { .. }, ApiResponse::Mst(mst)) => {
                match map {
                    Some(map) => {
                        overlays.render_mst(map, mst.edges_to_render());
                    }
                    None => tracing::warn!("tree arrived before the map existed"),
                }
                output.set(OutputMessage::Tree(TreeSummary::from(&mst)));
            }
            (pending, response) => {
                tracing::warn!(seq = ticket.seq, "mismatched navigation response: {pending:?} / {response:?}");
                output.error("Error: unexpected response from server");
            }
        }
        true
    }
}
