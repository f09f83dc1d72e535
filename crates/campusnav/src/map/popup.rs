//! Hover-triggered building detail popups.
//!
//! Each hover opens a session tagged with its ticket sequence number. A
//! lookup result is applied only while its session is still the active one;
//! once the pointer has left the marker or moved on to another marker, late
//! answers are dropped instead of reopening or overwriting a popup.

use serde_json::Value;

use crate::api::types::BuildingInfo;
use crate::api::{ApiRequest, Origin, RequestSink, Sequencer, Ticket};
use crate::error::Result;

use super::{Map, MarkerRef, PopupContent};

/// Longest detail value shown before truncation, in characters.
pub const MAX_DETAIL_CHARS: usize = 40;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq)]
struct HoverSession {
    seq: u64,
    marker: MarkerRef,
    building: String,
}

#[derive(Debug, Default)]
pub struct BuildingInfoPopupService {
    active: Option<HoverSession>,
}

impl BuildingInfoPopupService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker whose lookup is currently awaited or shown.
    pub fn active_marker(&self) -> Option<MarkerRef> {
        self.active.as_ref().map(|s| s.marker)
    }

    /// Start a detail lookup for `building`, shown on `marker` when it resolves.
    pub fn hover(
        &mut self,
        building: &str,
        marker: MarkerRef,
        sequencer: &mut Sequencer,
        sink: &mut dyn RequestSink,
    ) -> Ticket {
        let ticket = sequencer.ticket(Origin::Hover(marker));
        if let Some(previous) = self.active.replace(HoverSession {
            seq: ticket.seq,
            marker,
            building: building.to_string(),
        }) {
            tracing::debug!(seq = previous.seq, "hover on '{}' superseded", previous.building);
        }
        sink.submit(
            ticket,
            ApiRequest::BuildingInfo {
                name: building.to_string(),
            },
        );
        ticket
    }

    /// Close the marker's popup, whatever lookup may still be in flight.
    pub fn leave(&mut self, map: &mut Map, marker: MarkerRef) {
        if let Some(m) = map.marker_mut(marker) {
            m.popup.open = false;
        }
        if self.active_marker() == Some(marker) {
            self.active = None;
        }
    }

    /// Apply a lookup result if it belongs to the active session.
    /// Returns whether the popup was updated.
    pub fn on_info(&mut self, map: &mut Map, ticket: Ticket, result: Result<BuildingInfo>) -> bool {
        let Some(session) = self
            .active
            .as_ref()
            .filter(|s| s.seq == ticket.seq && Origin::Hover(s.marker) == ticket.origin)
        else {
            tracing::debug!(seq = ticket.seq, "discarding stale building info");
            return false;
        };

        let content = match result {
            Ok(info) => details_content(&session.building, &info),
            Err(e) => {
                tracing::debug!("building info for '{}' unavailable: {e}", session.building);
                PopupContent::Text(fallback_text(&session.building))
            }
        };

        match map.marker_mut(session.marker) {
            Some(marker) => {
                marker.popup.content = content;
                marker.popup.open = true;
                true
            }
            None => {
                tracing::debug!("hovered marker no longer on the map");
                self.active = None;
                false
            }
        }
    }
}

pub fn fallback_text(building: &str) -> String {
    format!("{building}\nNo additional information available.")
}

/// Popup body for a successful lookup; falsy details are left out.
pub fn details_content(building: &str, info: &BuildingInfo) -> PopupContent {
    let title = if info.name.is_empty() {
        building.to_string()
    } else {
        info.name.clone()
    };
    let rows = info
        .details
        .iter()
        .filter_map(|(key, value)| detail_value(value).map(|v| (key.clone(), v)))
        .collect();
    PopupContent::Details { title, rows }
}

/// Display text of a detail value; `None` for falsy values
/// (null, false, zero, empty string).
pub fn detail_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some(truncate(&text))
}

/// Cut to [`MAX_DETAIL_CHARS`] characters plus an ellipsis.
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
