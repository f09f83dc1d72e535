pub mod client;
pub mod dispatch;
pub mod types;

use geojson::GeoJson;

use crate::error::Result;
use crate::map::MarkerRef;

use types::{BuildingDirectory, BuildingInfo, MstResult, PathResult};

/// A backend call the client can make.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Buildings,
    ShortestPath { source: String, destination: String },
    Mst,
    BuildingInfo { name: String },
    CampusGeometry,
}

impl ApiRequest {
    /// Short label for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Buildings => "buildings".to_string(),
            Self::ShortestPath {
                source,
                destination,
            } => format!("shortest-path {source} -> {destination}"),
            Self::Mst => "mst".to_string(),
            Self::BuildingInfo { name } => format!("building-info {name}"),
            Self::CampusGeometry => "campus geometry".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApiResponse {
    Buildings(BuildingDirectory),
    Path(PathResult),
    Mst(MstResult),
    BuildingInfo(BuildingInfo),
    CampusGeometry(GeoJson),
}

/// Which component issued a request; completions are routed back by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Catalog,
    Boundary,
    Navigation,
    Hover(MarkerRef),
}

/// Tag attached to an outstanding request.
///
/// `seq` grows monotonically across all requests of one workspace, so a
/// component can tell whether a completion belongs to its latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub origin: Origin,
    pub seq: u64,
}

/// A finished request, delivered back to the UI thread.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<ApiResponse>,
}

/// Anything that can perform backend calls.
pub trait Backend: Send + Sync {
    fn fetch(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Where components hand off requests. Results come back later as
/// [`Completion`]s, in whatever order the backend answers.
pub trait RequestSink {
    fn submit(&mut self, ticket: Ticket, request: ApiRequest);
}

/// Hands out ticket sequence numbers.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: u64,
}

impl Sequencer {
    pub fn ticket(&mut self, origin: Origin) -> Ticket {
        self.last += 1;
        Ticket {
            origin,
            seq: self.last,
        }
    }
}

/// A sink that only records what was submitted.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub submitted: Vec<(Ticket, ApiRequest)>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn take(&mut self) -> Vec<(Ticket, ApiRequest)> {
        std::mem::take(&mut self.submitted)
    }
}

#[cfg(test)]
impl RequestSink for RecordingSink {
    fn submit(&mut self, ticket: Ticket, request: ApiRequest) {
        self.submitted.push((ticket, request));
    }
}
