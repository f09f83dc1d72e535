use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde_json::Value;
use ureq::Agent;

use crate::error::{NavError, Result};

use super::types::{self, ShortestPathQuery};
use super::{ApiRequest, ApiResponse, Backend};

pub const BUILDINGS_PATH: &str = "/api/buildings";
pub const SHORTEST_PATH_PATH: &str = "/api/shortest-path";
pub const MST_PATH: &str = "/api/mst";
pub const BUILDING_INFO_PATH: &str = "/api/building-info";
pub const CAMPUS_GEOMETRY_PATH: &str = "/static/data/campus_map.geojson";

/// Characters left as-is inside a path segment (the unreserved set).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Path of the detail lookup for one building; the name is percent-encoded.
pub fn building_info_path(name: &str) -> String {
    format!(
        "{BUILDING_INFO_PATH}/{}",
        utf8_percent_encode(name, PATH_SEGMENT)
    )
}

/// Blocking HTTP client for the campus navigation backend.
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        // Error statuses still carry `{error}` bodies worth reading.
        let config = Agent::config_builder().http_status_as_error(false).build();
        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let mut response = self.agent.get(&url).call()?;
        let status = response.status();
        let body = response.body_mut().read_json::<Value>();
        accept_body(status.as_u16(), url, body)
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("POST {url}");
        let mut response = self.agent.post(&url).send_json(body)?;
        let status = response.status();
        let body = response.body_mut().read_json::<Value>();
        accept_body(status.as_u16(), url, body)
    }
}

/// Keep a parsed body when the request succeeded or the backend explained the
/// failure; otherwise report the status.
fn accept_body(
    status: u16,
    url: String,
    body: std::result::Result<Value, ureq::Error>,
) -> Result<Value> {
    let success = (200..300).contains(&status);
    match body {
        Ok(value) if success || types::backend_error(&value).is_some() => Ok(value),
        Ok(_) => Err(NavError::Status { status, url }),
        Err(_) if !success => Err(NavError::Status { status, url }),
        Err(e) => Err(e.into()),
    }
}

impl Backend for HttpBackend {
    fn fetch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        match request {
            ApiRequest::Buildings => {
                let body = self.get_json(BUILDINGS_PATH)?;
                Ok(ApiResponse::Buildings(types::decode(body)?))
            }
            ApiRequest::ShortestPath {
                source,
                destination,
            } => {
                let query = ShortestPathQuery {
                    source: source.clone(),
                    destination: destination.clone(),
                };
                let body = self.post_json(SHORTEST_PATH_PATH, &query)?;
                Ok(ApiResponse::Path(types::decode(body)?))
            }
            ApiRequest::Mst => {
                let body = self.get_json(MST_PATH)?;
                Ok(ApiResponse::Mst(types::decode(body)?))
            }
            ApiRequest::BuildingInfo { name } => {
                let body = self.get_json(&building_info_path(name))?;
                Ok(ApiResponse::BuildingInfo(types::decode(body)?))
            }
            ApiRequest::CampusGeometry => {
                let body = self.get_json(CAMPUS_GEOMETRY_PATH)?;
                Ok(ApiResponse::CampusGeometry(types::decode(body)?))
            }
        }
    }
}
