//! The map instance and the shapes it draws.
//!
//! Everything here is plain data in render coordinates ([`LatLng`]); the
//! canvas in `render` turns it into pixels.

pub mod controller;
pub mod overlay;
pub mod popup;
pub mod viewport;

use eframe::egui::Color32;

use crate::geo::{Bounds, LatLng};

use viewport::Viewport;

/// Handle of a layer group added to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// A marker inside a layer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerRef {
    pub layer: LayerId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color32,
    pub weight: f32,
    pub opacity: f32,
    /// Dash and gap lengths in pixels; solid when `None`.
    pub dash: Option<[f32; 2]>,
}

impl LineStyle {
    pub const fn solid(color: Color32, weight: f32, opacity: f32) -> Self {
        Self {
            color,
            weight,
            opacity,
            dash: None,
        }
    }

    pub const fn dashed(color: Color32, weight: f32, opacity: f32, dash: [f32; 2]) -> Self {
        Self {
            color,
            weight,
            opacity,
            dash: Some(dash),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// A campus feature from the boundary collection.
    Place,
    /// Route start.
    Start,
    /// Route end.
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    Text(String),
    Details {
        title: String,
        rows: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub content: PopupContent,
    pub open: bool,
}

impl Popup {
    pub fn closed(text: impl Into<String>) -> Self {
        Self {
            content: PopupContent::Text(text.into()),
            open: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub kind: MarkerKind,
    /// Building this marker stands for, when the feature was named.
    pub building: Option<String>,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<LatLng>,
    pub style: LineStyle,
    pub popup: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<LatLng>>,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polyline(Polyline),
    Marker(Marker),
    Polygon(Polygon),
}

impl Shape {
    fn points(&self) -> Box<dyn Iterator<Item = LatLng> + '_> {
        match self {
            Shape::Polyline(line) => Box::new(line.points.iter().copied()),
            Shape::Marker(marker) => Box::new(std::iter::once(marker.position)),
            Shape::Polygon(poly) => Box::new(poly.rings.iter().flatten().copied()),
        }
    }
}

/// A named group of shapes added to and removed from the map as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGroup {
    pub name: String,
    shapes: Vec<Shape>,
}

impl LayerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Polyline(line) => Some(line),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = (usize, &Marker)> {
        self.shapes.iter().enumerate().filter_map(|(i, s)| match s {
            Shape::Marker(marker) => Some((i, marker)),
            _ => None,
        })
    }

    /// Bounds of every finite coordinate in the group.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.shapes.iter().flat_map(Shape::points))
    }
}

/// Raster tile source registered as the base layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

/// The single map instance: viewport, base tiles and layer groups in draw order.
#[derive(Debug)]
pub struct Map {
    pub viewport: Viewport,
    tiles: Option<TileLayer>,
    layers: Vec<(LayerId, LayerGroup)>,
    next_id: u64,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            viewport: Viewport::new(center, zoom),
            tiles: None,
            layers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn set_tile_layer(&mut self, tiles: TileLayer) {
        self.tiles = Some(tiles);
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.tiles.as_ref()
    }

    pub fn add_layer(&mut self, group: LayerGroup) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        tracing::debug!(layer = id.0, "adding layer '{}' ({} shapes)", group.name, group.shapes.len());
        self.layers.push((id, group));
        id
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<LayerGroup> {
        let pos = self.layers.iter().position(|(lid, _)| *lid == id)?;
        let (_, group) = self.layers.remove(pos);
        tracing::debug!(layer = id.0, "removed layer '{}'", group.name);
        Some(group)
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerGroup> {
        self.layers.iter().find(|(lid, _)| *lid == id).map(|(_, g)| g)
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &LayerGroup)> {
        self.layers.iter().map(|(id, g)| (*id, g))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn marker(&self, r: MarkerRef) -> Option<&Marker> {
        match self.layer(r.layer)?.shapes.get(r.index)? {
            Shape::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn marker_mut(&mut self, r: MarkerRef) -> Option<&mut Marker> {
        let (_, group) = self.layers.iter_mut().find(|(lid, _)| *lid == r.layer)?;
        match group.shapes.get_mut(r.index)? {
            Shape::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    /// Every marker on the map, in draw order.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerRef, &Marker)> {
        self.layers.iter().flat_map(|(id, group)| {
            group
                .markers()
                .map(move |(index, m)| (MarkerRef { layer: *id, index }, m))
        })
    }
}
