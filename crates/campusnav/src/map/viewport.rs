use std::f64::consts::PI;

use crate::geo::{Bounds, LatLng};

/// Web Mercator tile edge in pixels.
pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;
/// Fitting never zooms in past this level, even for a single point.
pub const FIT_MAX_ZOOM: f64 = 18.0;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Canvas size used until the UI reports the real one.
const DEFAULT_SIZE: [f64; 2] = [1280.0, 720.0];

/// Project to world pixel coordinates at `zoom`.
pub fn project(p: LatLng, zoom: f64) -> [f64; 2] {
    let scale = TILE_SIZE * zoom.exp2();
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    [x, y]
}

/// Inverse of [`project`].
pub fn unproject(pt: [f64; 2], zoom: f64) -> LatLng {
    let scale = TILE_SIZE * zoom.exp2();
    let lng = pt[0] / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * pt[1] / scale;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// What part of the world the canvas shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    /// Canvas width and height in pixels.
    pub size: [f64; 2],
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size: DEFAULT_SIZE,
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.size = [width, height];
        }
    }

    /// Canvas position of `p`, origin at the canvas top-left.
    pub fn to_screen(&self, p: LatLng) -> [f64; 2] {
        let c = project(self.center, self.zoom);
        let w = project(p, self.zoom);
        [
            w[0] - c[0] + self.size[0] / 2.0,
            w[1] - c[1] + self.size[1] / 2.0,
        ]
    }

    pub fn from_screen(&self, pt: [f64; 2]) -> LatLng {
        let c = project(self.center, self.zoom);
        unproject(
            [
                c[0] + pt[0] - self.size[0] / 2.0,
                c[1] + pt[1] - self.size[1] / 2.0,
            ],
            self.zoom,
        )
    }

    /// Move the view by a screen-space drag.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let c = project(self.center, self.zoom);
        self.center = unproject([c[0] - dx, c[1] - dy], self.zoom);
    }

    /// Change zoom keeping the point under `anchor` fixed on screen.
    pub fn zoom_around(&mut self, delta: f64, anchor: [f64; 2]) {
        let target = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        if target == self.zoom {
            return;
        }
        let fixed = self.from_screen(anchor);
        self.zoom = target;
        let moved = self.to_screen(fixed);
        self.pan_by(anchor[0] - moved[0], anchor[1] - moved[1]);
    }

    /// Center on `bounds` at the largest whole zoom level that keeps it
    /// inside the canvas minus `padding` on every side.
    pub fn fit_bounds(&mut self, bounds: Bounds, padding: f64) {
        let sw = project(bounds.south_west, 0.0);
        let ne = project(bounds.north_east, 0.0);
        let span_x = (ne[0] - sw[0]).abs();
        let span_y = (ne[1] - sw[1]).abs();
        let avail_x = (self.size[0] - 2.0 * padding).max(1.0);
        let avail_y = (self.size[1] - 2.0 * padding).max(1.0);

        let zoom = if span_x == 0.0 && span_y == 0.0 {
            FIT_MAX_ZOOM
        } else {
            let fit_x = if span_x > 0.0 { avail_x / span_x } else { f64::INFINITY };
            let fit_y = if span_y > 0.0 { avail_y / span_y } else { f64::INFINITY };
            fit_x.min(fit_y).log2().floor()
        };

        self.zoom = zoom.clamp(MIN_ZOOM, FIT_MAX_ZOOM);
        self.center = unproject([(sw[0] + ne[0]) / 2.0, (sw[1] + ne[1]) / 2.0], 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn project_round_trips() {
        let p = LatLng::new(7.0851, 125.4790);
        let back = unproject(project(p, 15.0), 15.0);
        assert!(close(back.lat, p.lat) && close(back.lng, p.lng));
    }

    #[test]
    fn center_maps_to_canvas_middle() {
        let mut v = Viewport::new(LatLng::new(7.0851, 125.4790), 15.0);
        v.set_size(800.0, 600.0);
        let s = v.to_screen(v.center);
        assert!(close(s[0], 400.0) && close(s[1], 300.0));
    }

    #[test]
    fn north_is_up_east_is_right() {
        let v = Viewport::new(LatLng::new(7.0, 125.0), 15.0);
        let c = v.to_screen(v.center);
        let north = v.to_screen(LatLng::new(7.001, 125.0));
        let east = v.to_screen(LatLng::new(7.0, 125.001));
        assert!(north[1] < c[1]);
        assert!(east[0] > c[0]);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut v = Viewport::new(LatLng::new(7.0, 125.0), 15.0);
        let anchor = [100.0, 200.0];
        let before = v.from_screen(anchor);
        v.zoom_around(1.0, anchor);
        assert!(close(v.zoom, 16.0));
        let after = v.to_screen(before);
        assert!((after[0] - anchor[0]).abs() < 1e-3);
        assert!((after[1] - anchor[1]).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut v = Viewport::new(LatLng::new(7.0, 125.0), 19.0);
        v.zoom_around(3.0, [0.0, 0.0]);
        assert_eq!(v.zoom, MAX_ZOOM);
    }

    #[test]
    fn fit_bounds_contains_both_corners() {
        let mut v = Viewport::new(LatLng::new(0.0, 0.0), 3.0);
        v.set_size(800.0, 600.0);
        let bounds = Bounds::from_points([LatLng::new(7.080, 125.470), LatLng::new(7.090, 125.485)])
            .unwrap();
        v.fit_bounds(bounds, 50.0);

        for corner in [bounds.south_west, bounds.north_east] {
            let s = v.to_screen(corner);
            assert!(s[0] >= 50.0 - 1e-6 && s[0] <= 750.0 + 1e-6, "x out of view: {s:?}");
            assert!(s[1] >= 50.0 - 1e-6 && s[1] <= 550.0 + 1e-6, "y out of view: {s:?}");
        }
        assert!(v.zoom >= 14.0);
        assert_eq!(v.zoom.fract(), 0.0);
    }

    #[test]
    fn fit_single_point_uses_max_fit_zoom() {
        let mut v = Viewport::new(LatLng::new(0.0, 0.0), 3.0);
        let p = LatLng::new(7.08, 125.47);
        v.fit_bounds(Bounds::from_point(p), 50.0);
        assert_eq!(v.zoom, FIT_MAX_ZOOM);
        assert!(close(v.center.lat, p.lat) && close(v.center.lng, p.lng));
    }
}
