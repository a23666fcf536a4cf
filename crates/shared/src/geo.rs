//! Great-circle distance computation for geofence checks.

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine great-circle distance between two points, in meters.
///
/// Pure and deterministic. Callers are responsible for range-validating
/// coordinates (lat -90..=90, lng -180..=180) before calling.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint::new(26.1445, 91.7362);
        assert!(haversine_m(p, p) < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(26.1445, 91.7362);
        let b = GeoPoint::new(26.1158, 91.7086);
        let d1 = haversine_m(a, b);
        let d2 = haversine_m(b, a);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let distance = haversine_m(london, paris);
        assert!((distance - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn one_block_in_guwahati_is_around_14_m() {
        // Destination vs an officer standing just off the gate.
        let target = GeoPoint::new(26.1445, 91.7362);
        let officer = GeoPoint::new(26.1446, 91.7363);
        let distance = haversine_m(target, officer);
        assert!(distance > 5.0 && distance < 25.0, "got {distance}");
    }

    #[test]
    fn antimeridian_neighbors_are_close() {
        let a = GeoPoint::new(0.0, 179.9995);
        let b = GeoPoint::new(0.0, -179.9995);
        // 0.001 degrees of longitude at the equator is about 111 m.
        let distance = haversine_m(a, b);
        assert!(distance < 200.0, "got {distance}");
    }
}
