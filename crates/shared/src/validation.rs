//! Common validation utilities for location payloads.

use validator::ValidationError;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lng: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lng) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that accuracy is non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("accuracy_range");
        err.message = Some("Accuracy must be non-negative".into());
        Err(err)
    }
}

/// Validates that heading is within valid range (0 to 360).
pub fn validate_heading(heading: f64) -> Result<(), ValidationError> {
    if (0.0..=360.0).contains(&heading) {
        Ok(())
    } else {
        let mut err = ValidationError::new("heading_range");
        err.message = Some("Heading must be between 0 and 360".into());
        Err(err)
    }
}

/// Validates that speed is non-negative.
pub fn validate_speed(speed: f64) -> Result<(), ValidationError> {
    if speed >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("speed_range");
        err.message = Some("Speed must be non-negative".into());
        Err(err)
    }
}

/// Validates that a geofence radius is non-negative.
pub fn validate_geofence_radius(radius: f64) -> Result<(), ValidationError> {
    if radius >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("geofence_radius_range");
        err.message = Some("Geofence radius must be non-negative".into());
        Err(err)
    }
}
