//! Map canvas: paints the layer groups of a [`Map`] with egui and turns
//! pointer input into pan, zoom and hover events.

use eframe::egui::{self, Color32, Pos2, Rect, Stroke};

use crate::geo::LatLng;
use crate::map::viewport::{TILE_SIZE, project};
use crate::map::{LineStyle, Map, Marker, MarkerKind, MarkerRef, PopupContent, Shape};
use crate::theme::Theme;

/// Pointer distance in pixels that still counts as over a marker.
pub const MARKER_HIT_RADIUS: f32 = 10.0;
/// Pointer distance in pixels that still counts as on a line.
pub const LINE_HIT_TOLERANCE: f32 = 6.0;
const MARKER_RADIUS: f32 = 7.0;
const POPUP_WIDTH: f32 = 240.0;
const POPUP_PADDING: f32 = 8.0;
/// Zoom levels per scrolled pixel.
const SCROLL_ZOOM_RATE: f64 = 1.0 / 120.0;
/// Dashes are cut this far outside the canvas so line caps stay hidden.
const DASH_CLIP_MARGIN: f32 = 16.0;
/// Upper bound on dashes drawn for one polyline segment.
pub const MAX_DASHES_PER_SEGMENT: usize = 4096;

/// What happened on the canvas this frame.
#[derive(Debug, Default)]
pub struct CanvasResponse {
    /// Marker under the pointer, if any.
    pub hovered: Option<MarkerRef>,
    /// Popup text and anchor of a clicked line.
    pub clicked_line: Option<(LatLng, String)>,
    /// Clicked on empty map.
    pub clicked_empty: bool,
}

fn to_pos(origin: Pos2, pt: [f64; 2]) -> Pos2 {
    Pos2::new(origin.x + pt[0] as f32, origin.y + pt[1] as f32)
}

fn from_pos(origin: Pos2, pos: Pos2) -> [f64; 2] {
    [(pos.x - origin.x) as f64, (pos.y - origin.y) as f64]
}

/// Draw the map into all remaining space of `ui` and handle input.
pub fn show(
    ui: &mut egui::Ui,
    map: &mut Map,
    theme: &Theme,
    line_popup: Option<&(LatLng, String)>,
) -> CanvasResponse {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let rect = response.rect;
    let origin = rect.min;
    map.viewport.set_size(rect.width() as f64, rect.height() as f64);

    if response.dragged() {
        let delta = response.drag_delta();
        map.viewport.pan_by(delta.x as f64, delta.y as f64);
    }
    if let Some(pointer) = response.hover_pos() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            map.viewport
                .zoom_around(scroll as f64 * SCROLL_ZOOM_RATE, from_pos(origin, pointer));
        }
    }

    painter.rect_filled(rect, 0.0, theme.background);
    draw_tile_grid(&painter, rect, map, theme);

    for (_, group) in map.layers() {
        for shape in group.shapes() {
            match shape {
                Shape::Polygon(poly) => {
                    for ring in &poly.rings {
                        let points = screen_points(map, origin, ring);
                        painter.add(egui::Shape::closed_line(points, stroke_for(&poly.style)));
                    }
                }
                Shape::Polyline(line) => {
                    let points = screen_points(map, origin, &line.points);
                    draw_polyline(&painter, &points, &line.style, rect);
                }
                Shape::Marker(marker) => draw_marker(&painter, map, origin, marker, theme),
            }
        }
    }

    let pointer = response.hover_pos();
    let hovered = pointer.and_then(|p| hit_marker(map, from_pos(origin, p), MARKER_HIT_RADIUS));

    for (_, marker) in map.markers() {
        if marker.popup.open {
            let anchor = to_pos(origin, map.viewport.to_screen(marker.position));
            draw_popup(&painter, anchor, &marker.popup.content, theme);
        }
    }
    // Static labels of endpoint and unnamed markers show while hovered.
    if let Some(marker) = hovered
        .and_then(|r| map.marker(r))
        .filter(|m| m.building.is_none() && !m.popup.open)
    {
        let anchor = to_pos(origin, map.viewport.to_screen(marker.position));
        draw_popup(&painter, anchor, &marker.popup.content, theme);
    }
    if let Some((at, text)) = line_popup {
        let anchor = to_pos(origin, map.viewport.to_screen(*at));
        draw_popup(&painter, anchor, &PopupContent::Text(text.clone()), theme);
    }

    draw_attribution(&painter, rect, map, theme);

    let mut out = CanvasResponse {
        hovered,
        ..Default::default()
    };
    if let Some(p) = response.interact_pointer_pos().filter(|_| response.clicked()) {
        let pt = from_pos(origin, p);
        match hit_line(map, pt, LINE_HIT_TOLERANCE) {
            Some(text) => out.clicked_line = Some((map.viewport.from_screen(pt), text)),
            None => out.clicked_empty = hovered.is_none(),
        }
    }
    out
}

fn screen_points(map: &Map, origin: Pos2, points: &[LatLng]) -> Vec<Pos2> {
    points
        .iter()
        .map(|p| to_pos(origin, map.viewport.to_screen(*p)))
        .collect()
}

fn stroke_for(style: &LineStyle) -> Stroke {
    Stroke::new(style.weight, Theme::with_opacity(style.color, style.opacity))
}

fn draw_polyline(painter: &egui::Painter, points: &[Pos2], style: &LineStyle, canvas: Rect) {
    if points.len() < 2 {
        return;
    }
    let stroke = stroke_for(style);
    match style.dash {
        None => {
            painter.add(egui::Shape::line(points.to_vec(), stroke));
        }
        Some([dash, gap]) => {
            let clip = canvas.expand(DASH_CLIP_MARGIN);
            for segment in dash_segments(points, dash, gap, clip) {
                painter.line_segment(segment, stroke);
            }
        }
    }
}

/// Split a polyline into dash segments, continuing the pattern across corners.
///
/// Only the part of each segment inside `clip` is dashed, and no segment
/// yields more than [`MAX_DASHES_PER_SEGMENT`] dashes. Distances are walked
/// in `f64` so far-off coordinates still advance the pattern.
pub fn dash_segments(points: &[Pos2], dash: f32, gap: f32, clip: Rect) -> Vec<[Pos2; 2]> {
    let mut segments = Vec::new();
    if dash <= 0.0 || gap < 0.0 {
        return segments;
    }
    let (dash, gap) = (dash as f64, gap as f64);
    let period = dash + gap;
    // Length walked so far, modulo the pattern period.
    let mut phase = 0.0_f64;

    for pair in points.windows(2) {
        let a = [pair[0].x as f64, pair[0].y as f64];
        let b = [pair[1].x as f64, pair[1].y as f64];
        let len = (b[0] - a[0]).hypot(b[1] - a[1]);
        if !len.is_finite() || len <= 0.0 {
            continue;
        }
        let at = |d: f64| {
            let t = d / len;
            Pos2::new((a[0] + (b[0] - a[0]) * t) as f32, (a[1] + (b[1] - a[1]) * t) as f32)
        };

        if let Some((t0, t1)) = clip_segment(a, b, clip) {
            let end = t1 * len;
            let mut d = t0 * len;
            let mut pos = (phase + d) % period;
            let mut dashes = 0;
            while d < end && dashes < MAX_DASHES_PER_SEGMENT {
                if pos < dash {
                    let run = (dash - pos).min(end - d);
                    segments.push([at(d), at(d + run)]);
                    dashes += 1;
                    d += run;
                    pos += run;
                } else {
                    d += period - pos;
                    pos = 0.0;
                }
            }
        }
        phase = (phase + len) % period;
    }
    segments
}

/// Parameter range `[t0, t1]` of the segment `a..b` inside `clip`
/// (Liang-Barsky), or `None` when it misses.
fn clip_segment(a: [f64; 2], b: [f64; 2], clip: Rect) -> Option<(f64, f64)> {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let bounds = [
        (-dx, a[0] - clip.min.x as f64),
        (dx, clip.max.x as f64 - a[0]),
        (-dy, a[1] - clip.min.y as f64),
        (dy, clip.max.y as f64 - a[1]),
    ];
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    (t0 < t1).then_some((t0, t1))
}

fn draw_marker(painter: &egui::Painter, map: &Map, origin: Pos2, marker: &Marker, theme: &Theme) {
    let center = to_pos(origin, map.viewport.to_screen(marker.position));
    let fill = match marker.kind {
        MarkerKind::Place => theme.place_marker,
        MarkerKind::Start => theme.start_marker,
        MarkerKind::End => theme.end_marker,
    };
    painter.circle(center, MARKER_RADIUS, fill, Stroke::new(2.0, Color32::WHITE));
}

fn draw_popup(painter: &egui::Painter, anchor: Pos2, content: &PopupContent, theme: &Theme) {
    let text_width = POPUP_WIDTH - POPUP_PADDING * 2.0;
    let (title, body) = match content {
        PopupContent::Text(text) => (None, text.clone()),
        PopupContent::Details { title, rows } => (
            Some(title.clone()),
            rows.iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    };

    let title_galley = title.map(|t| {
        painter.layout(
            t,
            egui::FontId::proportional(theme.body_size + 1.0),
            theme.heading_color,
            text_width,
        )
    });
    let body_galley = painter.layout(
        body,
        egui::FontId::proportional(theme.body_size - 1.0),
        theme.popup_foreground,
        text_width,
    );

    let title_height = title_galley.as_ref().map_or(0.0, |g| g.rect.height() + 4.0);
    let width = title_galley
        .as_ref()
        .map_or(0.0, |g| g.rect.width())
        .max(body_galley.rect.width())
        + POPUP_PADDING * 2.0;
    let height = title_height + body_galley.rect.height() + POPUP_PADDING * 2.0;
    let bubble = Rect::from_min_size(
        Pos2::new(anchor.x - width / 2.0, anchor.y - MARKER_RADIUS - 6.0 - height),
        egui::vec2(width, height),
    );

    painter.rect_filled(bubble.translate(egui::vec2(1.0, 2.0)), 6.0, Theme::with_opacity(Color32::BLACK, 0.2));
    painter.rect_filled(bubble, 6.0, theme.popup_background);
    let mut cursor = bubble.min + egui::vec2(POPUP_PADDING, POPUP_PADDING);
    if let Some(galley) = title_galley {
        let h = galley.rect.height();
        painter.galley(cursor, galley, theme.heading_color);
        cursor.y += h + 4.0;
    }
    painter.galley(cursor, body_galley, theme.popup_foreground);
}

/// Faint tile boundaries standing in for the raster base layer.
fn draw_tile_grid(painter: &egui::Painter, rect: Rect, map: &Map, theme: &Theme) {
    let vp = &map.viewport;
    let c = project(vp.center, vp.zoom);
    let left = c[0] - vp.size[0] / 2.0;
    let top = c[1] - vp.size[1] / 2.0;
    let stroke = Stroke::new(1.0, Theme::with_opacity(theme.muted, 0.15));

    let mut x = (left / TILE_SIZE).floor() * TILE_SIZE;
    while x < left + vp.size[0] {
        let sx = rect.left() + (x - left) as f32;
        painter.line_segment([Pos2::new(sx, rect.top()), Pos2::new(sx, rect.bottom())], stroke);
        x += TILE_SIZE;
    }
    let mut y = (top / TILE_SIZE).floor() * TILE_SIZE;
    while y < top + vp.size[1] {
        let sy = rect.top() + (y - top) as f32;
        painter.line_segment([Pos2::new(rect.left(), sy), Pos2::new(rect.right(), sy)], stroke);
        y += TILE_SIZE;
    }
}

fn draw_attribution(painter: &egui::Painter, rect: Rect, map: &Map, theme: &Theme) {
    let Some(tiles) = map.tile_layer() else {
        return;
    };
    let galley = painter.layout_no_wrap(
        tiles.attribution.clone(),
        egui::FontId::proportional(theme.small_size),
        theme.muted,
    );
    let pad = 4.0;
    let bg = Rect::from_min_size(
        Pos2::new(
            rect.right() - galley.rect.width() - pad * 2.0,
            rect.bottom() - galley.rect.height() - pad * 2.0,
        ),
        galley.rect.size() + egui::vec2(pad * 2.0, pad * 2.0),
    );
    painter.rect_filled(bg, 0.0, Theme::with_opacity(theme.panel, 0.8));
    painter.galley(bg.min + egui::vec2(pad, pad), galley, theme.muted);
}

/// Topmost marker within `radius` pixels of the canvas point `pt`.
pub fn hit_marker(map: &Map, pt: [f64; 2], radius: f32) -> Option<MarkerRef> {
    let radius = radius as f64;
    map.markers()
        .filter(|(_, m)| {
            let s = map.viewport.to_screen(m.position);
            (s[0] - pt[0]).hypot(s[1] - pt[1]) <= radius
        })
        .last()
        .map(|(r, _)| r)
}

/// Popup text of the topmost line within `tolerance` pixels of `pt`.
pub fn hit_line(map: &Map, pt: [f64; 2], tolerance: f32) -> Option<String> {
    let p = Pos2::new(pt[0] as f32, pt[1] as f32);
    let mut found = None;
    for (_, group) in map.layers() {
        for line in group.polylines() {
            let Some(popup) = &line.popup else { continue };
            let points: Vec<Pos2> = line
                .points
                .iter()
                .map(|ll| {
                    let s = map.viewport.to_screen(*ll);
                    Pos2::new(s[0] as f32, s[1] as f32)
                })
                .collect();
            if points
                .windows(2)
                .any(|w| distance_to_segment(p, w[0], w[1]) <= tolerance)
            {
                found = Some(popup.clone());
            }
        }
    }
    found
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
