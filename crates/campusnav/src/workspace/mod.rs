//! The single owner of all map-related state.
//!
//! Components never hold references to each other; the workspace lends them
//! what they need for each call and routes every completion back to the
//! component whose ticket it carries.

#[cfg(test)]
mod tests;

use geojson::GeoJson;

use crate::api::types::{BuildingDirectory, BuildingInfo};
use crate::api::{ApiResponse, Completion, Origin, RequestSink, Sequencer, Ticket};
use crate::catalog::BuildingCatalog;
use crate::error::{NavError, Result};
use crate::geo::LatLng;
use crate::map::controller::MapController;
use crate::map::overlay::RouteOverlayManager;
use crate::map::popup::BuildingInfoPopupService;
use crate::map::{MarkerRef, TileLayer};
use crate::navigation::{NavigationRequestCoordinator, RouteRejection};
use crate::output::OutputRegion;

/// Where the map starts and which tiles it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub center: LatLng,
    pub zoom: f64,
    pub tiles: TileLayer,
}

pub struct CampusMap {
    settings: MapSettings,
    sequencer: Sequencer,
    pub map: MapController,
    pub overlays: RouteOverlayManager,
    pub catalog: BuildingCatalog,
    pub popups: BuildingInfoPopupService,
    pub navigation: NavigationRequestCoordinator,
    pub output: OutputRegion,
}

impl CampusMap {
    pub fn new(settings: MapSettings) -> Self {
        Self {
            settings,
            sequencer: Sequencer::default(),
            map: MapController::new(),
            overlays: RouteOverlayManager::new(),
            catalog: BuildingCatalog::new(),
            popups: BuildingInfoPopupService::new(),
            navigation: NavigationRequestCoordinator::new(),
            output: OutputRegion::new(),
        }
    }

    /// Page-load work: create the map and fetch the building list.
    pub fn start(&mut self, sink: &mut dyn RequestSink) {
        let settings = self.settings.clone();
        self.map.init(
            settings.center,
            settings.zoom,
            settings.tiles,
            &mut self.sequencer,
            sink,
        );
        self.catalog.load_buildings(&mut self.sequencer, sink);
    }

    /// Request a route between the two selected buildings.
    pub fn find_path(&mut self, sink: &mut dyn RequestSink) -> std::result::Result<Ticket, RouteRejection> {
        let source = self.catalog.source.value().to_string();
        let destination = self.catalog.destination.value().to_string();
        self.request_path(&source, &destination, sink)
    }

    pub fn request_path(
        &mut self,
        source: &str,
        destination: &str,
        sink: &mut dyn RequestSink,
    ) -> std::result::Result<Ticket, RouteRejection> {
        self.navigation.request_path(
            source,
            destination,
            &mut self.sequencer,
            sink,
            &mut self.output,
        )
    }

    pub fn show_mst(&mut self, sink: &mut dyn RequestSink) -> Ticket {
        self.navigation
            .request_mst(&mut self.sequencer, sink, &mut self.output)
    }

    /// Pointer entered a marker. Unnamed markers keep their static label.
    pub fn hover(&mut self, marker: MarkerRef, sink: &mut dyn RequestSink) -> Option<Ticket> {
        let building = self
            .map
            .map()
            .and_then(|m| m.marker(marker))
            .and_then(|m| m.building.clone())?;
        Some(
            self.popups
                .hover(&building, marker, &mut self.sequencer, sink),
        )
    }

    /// Pointer left a marker.
    pub fn leave(&mut self, marker: MarkerRef) {
        if let Some(map) = self.map.map_mut() {
            self.popups.leave(map, marker);
        }
    }

    /// Apply one finished request.
    pub fn handle(&mut self, completion: Completion) {
        let Completion { ticket, result } = completion;
        match ticket.origin {
            Origin::Catalog => self
                .catalog
                .on_loaded(result.and_then(expect_buildings), &mut self.output),
            Origin::Boundary => self
                .map
                .on_boundary_loaded(result.and_then(expect_geometry)),
            Origin::Navigation => {
                self.navigation.on_completion(
                    ticket,
                    result,
                    self.map.map_mut(),
                    &mut self.overlays,
                    &mut self.output,
                );
            }
            Origin::Hover(_) => match self.map.map_mut() {
                Some(map) => {
                    self.popups
                        .on_info(map, ticket, result.and_then(expect_info));
                }
                None => tracing::debug!("building info arrived without a map"),
            },
        }
    }
}

fn expect_buildings(response: ApiResponse) -> Result<BuildingDirectory> {
    match response {
        ApiResponse::Buildings(directory) => Ok(directory),
        _ => Err(NavError::Unexpected("building list")),
    }
}

fn expect_geometry(response: ApiResponse) -> Result<GeoJson> {
    match response {
        ApiResponse::CampusGeometry(geojson) => Ok(geojson),
        _ => Err(NavError::Unexpected("campus geometry")),
    }
}

fn expect_info(response: ApiResponse) -> Result<BuildingInfo> {
    match response {
        ApiResponse::BuildingInfo(info) => Ok(info),
        _ => Err(NavError::Unexpected("building info")),
    }
}
