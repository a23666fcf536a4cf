//! Geofence evaluation against task target coordinates.

use shared::geo::{haversine_m, GeoPoint};

/// Result of checking a submission against a task's geofence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceCheck {
    pub distance_m: f64,
    pub within: bool,
}

/// Computes the Haversine distance from `actual` to `target` and whether
/// it falls within `radius_m`.
///
/// The verdict is advisory: callers persist the submission either way and
/// only vary the response message.
pub fn evaluate_geofence(target: GeoPoint, actual: GeoPoint, radius_m: f64) -> GeofenceCheck {
    let distance_m = haversine_m(target, actual);
    GeofenceCheck {
        distance_m,
        within: distance_m <= radius_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_target_is_within_any_nonnegative_radius() {
        let p = GeoPoint::new(26.1445, 91.7362);
        let check = evaluate_geofence(p, p, 0.0);
        assert!(check.within);
        assert!(check.distance_m < 1e-9);
    }

    #[test]
    fn test_nearby_point_within_100m_fence() {
        // ~14 m off the destination gate.
        let target = GeoPoint::new(26.1445, 91.7362);
        let actual = GeoPoint::new(26.1446, 91.7363);
        let check = evaluate_geofence(target, actual, 100.0);
        assert!(check.within);
        assert!(check.distance_m < 25.0);
    }

    #[test]
    fn test_distant_point_outside_fence_but_measured() {
        let target = GeoPoint::new(26.1445, 91.7362);
        let actual = GeoPoint::new(26.1545, 91.7362); // ~1.1 km north
        let check = evaluate_geofence(target, actual, 100.0);
        assert!(!check.within);
        assert!(check.distance_m > 1_000.0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let target = GeoPoint::new(0.0, 0.0);
        let actual = GeoPoint::new(0.0, 0.0);
        let check = evaluate_geofence(target, actual, 0.0);
        assert!(check.within, "distance == radius counts as within");
    }
}
