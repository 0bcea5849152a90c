//! Web-Mercator ("slippy map") projection and tile math.
//!
//! World pixel space at zoom `z` is `TILE_SIZE * 2^z` pixels square, origin at
//! the top-left (180 W, ~85.05 N). Screen space is relative to the top-left
//! of the map container, with the view center in the middle.

use crate::models::{GeoCoordinate, ViewState};

pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web-Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// WGS84 equatorial radius, used for ground resolution.
const EQUATOR_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileRef {
    /// Fill a `{z}/{x}/{y}` URL template.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// A tile and where its top-left corner lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub tile: TileRef,
    /// Column before wrapping; tells repeated copies of one tile apart.
    pub column: i64,
    pub left: f64,
    pub top: f64,
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Coordinate to world pixels at `zoom`.
pub fn project(coord: GeoCoordinate, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = coord.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (coord.longitude + 180.0) / 360.0 * size;
    let siny = lat.sin();
    let y = (0.5 - ((1.0 + siny) / (1.0 - siny)).ln() / (4.0 * std::f64::consts::PI)) * size;
    (x, y)
}

/// World pixels at `zoom` back to a coordinate. Longitude is wrapped into [-180, 180).
pub fn unproject(x: f64, y: f64, zoom: u8) -> GeoCoordinate {
    let size = world_size(zoom);
    let lon = (x / size * 360.0).rem_euclid(360.0) - 180.0;
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    GeoCoordinate::new(lat, lon)
}

/// Screen position of `coord` in a `width` x `height` container showing `view`.
pub fn to_screen(view: &ViewState, width: f64, height: f64, coord: GeoCoordinate) -> (f64, f64) {
    let (cx, cy) = project(view.center, view.zoom);
    let (px, py) = project(coord, view.zoom);
    (px - cx + width / 2.0, py - cy + height / 2.0)
}

/// Coordinate under a screen position.
pub fn from_screen(view: &ViewState, width: f64, height: f64, sx: f64, sy: f64) -> GeoCoordinate {
    let (cx, cy) = project(view.center, view.zoom);
    unproject(cx + sx - width / 2.0, cy + sy - height / 2.0, view.zoom)
}

/// New center after the content was dragged by (`dx`, `dy`) screen pixels.
pub fn pan_center(view: &ViewState, dx: f64, dy: f64) -> GeoCoordinate {
    let (cx, cy) = project(view.center, view.zoom);
    let size = world_size(view.zoom);
    let y = (cy - dy).clamp(0.0, size);
    unproject(cx - dx, y, view.zoom)
}

/// Change zoom while keeping the coordinate under (`sx`, `sy`) fixed on screen.
pub fn zoom_around(
    view: &ViewState,
    width: f64,
    height: f64,
    sx: f64,
    sy: f64,
    new_zoom: u8,
) -> ViewState {
    let anchor = from_screen(view, width, height, sx, sy);
    let (ax, ay) = project(anchor, new_zoom);
    let center = unproject(ax - (sx - width / 2.0), ay - (sy - height / 2.0), new_zoom);
    ViewState {
        center,
        zoom: new_zoom,
    }
}

/// Ground resolution in meters per screen pixel at `latitude`.
pub fn meters_per_pixel(latitude: f64, zoom: u8) -> f64 {
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    lat.cos() * 2.0 * std::f64::consts::PI * EQUATOR_RADIUS_M / world_size(zoom)
}

/// Radius in screen pixels for a circle of `meters` around `latitude`.
pub fn meters_to_pixels(meters: f64, latitude: f64, zoom: u8) -> f64 {
    meters / meters_per_pixel(latitude, zoom)
}

/// All tiles overlapping the container, with their screen offsets.
/// Columns wrap around the antimeridian; rows outside the world are skipped.
pub fn visible_tiles(view: &ViewState, width: f64, height: f64) -> Vec<PlacedTile> {
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let (cx, cy) = project(view.center, view.zoom);
    let left = cx - width / 2.0;
    let top = cy - height / 2.0;
    let count = 1i64 << view.zoom;

    let first_col = (left / TILE_SIZE).floor() as i64;
    let last_col = ((left + width) / TILE_SIZE).ceil() as i64 - 1;
    let first_row = ((top / TILE_SIZE).floor() as i64).max(0);
    let last_row = (((top + height) / TILE_SIZE).ceil() as i64 - 1).min(count - 1);

    let mut tiles = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            tiles.push(PlacedTile {
                tile: TileRef {
                    x: col.rem_euclid(count) as u32,
                    y: row as u32,
                    z: view.zoom,
                },
                column: col,
                left: col as f64 * TILE_SIZE - left,
                top: row as f64 * TILE_SIZE - top,
            });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(lat: f64, lon: f64, zoom: u8) -> ViewState {
        ViewState {
            center: GeoCoordinate::new(lat, lon),
            zoom,
        }
    }

    #[test]
    fn test_project_origin_is_world_center() {
        let (x, y) = project(GeoCoordinate::new(0.0, 0.0), 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let c = GeoCoordinate::new(52.14, 12.593);
        let (x, y) = project(c, 15);
        let back = unproject(x, y, 15);
        assert!((back.latitude - c.latitude).abs() < 1e-9);
        assert!((back.longitude - c.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_project_clamps_poles() {
        let (_, y) = project(GeoCoordinate::new(90.0, 0.0), 1);
        assert!(y.is_finite());
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_unproject_wraps_longitude() {
        let c = unproject(world_size(2) + 10.0, world_size(2) / 2.0, 2);
        assert!(c.longitude >= -180.0 && c.longitude < 180.0);
    }

    #[test]
    fn test_center_maps_to_container_middle() {
        let v = view(52.14, 12.593, 15);
        let (sx, sy) = to_screen(&v, 800.0, 600.0, v.center);
        assert!((sx - 400.0).abs() < 1e-6);
        assert!((sy - 300.0).abs() < 1e-6);
        let back = from_screen(&v, 800.0, 600.0, 400.0, 300.0);
        assert!((back.latitude - 52.14).abs() < 1e-9);
    }

    #[test]
    fn test_pan_right_moves_center_west() {
        let v = view(52.14, 12.593, 15);
        let c = pan_center(&v, 100.0, 0.0);
        assert!(c.longitude < v.center.longitude);
        assert!((c.latitude - v.center.latitude).abs() < 1e-9);
    }

    #[test]
    fn test_pan_down_moves_center_north() {
        let v = view(52.14, 12.593, 15);
        let c = pan_center(&v, 0.0, 100.0);
        assert!(c.latitude > v.center.latitude);
    }

    #[test]
    fn test_zoom_around_center_keeps_center() {
        let v = view(52.14, 12.593, 15);
        let z = zoom_around(&v, 800.0, 600.0, 400.0, 300.0, 16);
        assert_eq!(z.zoom, 16);
        assert!((z.center.latitude - v.center.latitude).abs() < 1e-9);
        assert!((z.center.longitude - v.center.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_around_cursor_keeps_anchor() {
        let v = view(52.14, 12.593, 15);
        let anchor = from_screen(&v, 800.0, 600.0, 100.0, 50.0);
        let z = zoom_around(&v, 800.0, 600.0, 100.0, 50.0, 17);
        let (sx, sy) = to_screen(&z, 800.0, 600.0, anchor);
        assert!((sx - 100.0).abs() < 1e-6);
        assert!((sy - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_meters_per_pixel_equator_zoom0() {
        let mpp = meters_per_pixel(0.0, 0);
        assert!((mpp - 156_543.03).abs() < 0.01);
    }

    #[test]
    fn test_meters_to_pixels_geofence() {
        // 50 m at 52 N, zoom 15: roughly 17 px
        let px = meters_to_pixels(50.0, 52.14, 15);
        assert!(px > 15.0 && px < 19.0, "got {px}");
    }

    #[test]
    fn test_visible_tiles_cover_container() {
        let v = view(52.14, 12.593, 15);
        let tiles = visible_tiles(&v, 512.0, 512.0);
        // 512 px spans 2 tiles plus partial tiles on each side
        assert!(tiles.len() >= 4 && tiles.len() <= 9, "got {}", tiles.len());
        for t in &tiles {
            assert!(t.left > -TILE_SIZE && t.left < 512.0);
            assert!(t.top > -TILE_SIZE && t.top < 512.0);
            assert_eq!(t.tile.z, 15);
        }
    }

    #[test]
    fn test_visible_tiles_zoom0_single_world() {
        let v = view(0.0, 0.0, 0);
        let tiles = visible_tiles(&v, 256.0, 256.0);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].tile, TileRef { x: 0, y: 0, z: 0 });
        assert!(tiles[0].left.abs() < 1e-9);
    }

    #[test]
    fn test_visible_tiles_wrap_antimeridian() {
        let v = view(0.0, 179.99, 2);
        let tiles = visible_tiles(&v, 512.0, 256.0);
        assert!(tiles.iter().any(|t| t.tile.x == 0));
        assert!(tiles.iter().any(|t| t.tile.x == 3));
        let wrapped = tiles.iter().find(|t| t.tile.x == 0).unwrap();
        assert_eq!(wrapped.column, 4);
    }

    #[test]
    fn test_visible_tiles_empty_container() {
        assert!(visible_tiles(&view(0.0, 0.0, 3), 0.0, 100.0).is_empty());
    }

    #[test]
    fn test_tile_url_template() {
        let t = TileRef { x: 3, y: 5, z: 4 };
        assert_eq!(
            t.url("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            "https://tile.openstreetmap.org/4/3/5.png"
        );
    }
}
