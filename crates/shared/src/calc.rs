use crate::models::{GeoCoordinate, Locale};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates (haversine).
pub fn distance(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial compass bearing from `from` to `to` in degrees [0, 360).
/// Clockwise from north.
pub fn bearing(from: GeoCoordinate, to: GeoCoordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let deg = y.atan2(x).to_degrees();
    if deg < 0.0 { deg + 360.0 } else { deg }
}

/// Human-readable distance: whole meters below 1 km, one decimal in km above.
/// German uses a decimal comma.
pub fn format_distance(meters: f64, locale: Locale) -> String {
    let rounded = meters.round();
    if rounded < 1000.0 {
        return format!("{} m", rounded as u64);
    }
    let km = format!("{:.1}", meters / 1000.0);
    match locale {
        Locale::En => format!("{km} km"),
        Locale::De => format!("{} km", km.replace('.', ",")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHURCH: GeoCoordinate = GeoCoordinate::new(52.1400, 12.5930);

    #[test]
    fn test_distance_zero_for_same_point() {
        assert!(distance(CHURCH, CHURCH).abs() < 1e-6);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            (CHURCH, GeoCoordinate::new(52.1450, 12.6000)),
            (GeoCoordinate::new(-33.86, 151.21), GeoCoordinate::new(51.5, -0.12)),
            (GeoCoordinate::new(90.0, 0.0), GeoCoordinate::new(-90.0, 180.0)),
            (GeoCoordinate::new(0.0, -180.0), GeoCoordinate::new(0.0, 180.0)),
        ];
        for (a, b) in pairs {
            assert!((distance(a, b) - distance(b, a)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_distance_small_longitude_step() {
        // 0.0001 deg of longitude at 52.14 N
        let d = distance(CHURCH, GeoCoordinate::new(52.1400, 12.5931));
        assert!((d - 6.83).abs() < 0.05, "got {d}");
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let d = distance(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_distance_antipodal_is_half_circumference() {
        let d = distance(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half).abs() < 1e-3);
        assert!(!d.is_nan());
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let d = distance(GeoCoordinate::new(0.0, 179.9999), GeoCoordinate::new(0.0, -179.9999));
        assert!(d < 30.0, "got {d}");
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        assert!((bearing(origin, GeoCoordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(origin, GeoCoordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, GeoCoordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(origin, GeoCoordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_distance_meters() {
        assert_eq!(format_distance(6.8, Locale::En), "7 m");
        assert_eq!(format_distance(999.4, Locale::De), "999 m");
    }

    #[test]
    fn test_format_distance_kilometers() {
        assert_eq!(format_distance(1234.0, Locale::En), "1.2 km");
        assert_eq!(format_distance(1234.0, Locale::De), "1,2 km");
    }

    #[test]
    fn test_format_distance_rounds_up_into_kilometers() {
        assert_eq!(format_distance(999.6, Locale::En), "1.0 km");
        assert_eq!(format_distance(999.6, Locale::De), "1,0 km");
        assert_eq!(format_distance(999.49, Locale::En), "999 m");
    }
}
