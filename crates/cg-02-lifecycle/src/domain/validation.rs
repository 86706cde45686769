//! Submission validation: every required field non-empty, at least one
//! photo, coordinates in range.

use shared_types::entities::{GeoPoint, MediaRef};
use shared_types::errors::CoreError;

/// Validate the payload of a new issue report.
///
/// # Errors
/// - `Validation`: a required field is missing or malformed
pub fn validate_submission(
    description: &str,
    photos: &[MediaRef],
    location: &GeoPoint,
) -> Result<(), CoreError> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    if photos.is_empty() {
        return Err(CoreError::Validation(
            "at least one photo reference is required".to_string(),
        ));
    }
    if let Some(blank) = photos.iter().find(|p| p.is_empty()) {
        return Err(CoreError::Validation(format!(
            "photo reference '{blank}' is blank"
        )));
    }
    if !location.is_valid() {
        return Err(CoreError::Validation(format!(
            "location ({}, {}) is out of range",
            location.lat, location.lng
        )));
    }
    Ok(())
}
