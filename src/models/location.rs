use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{FetchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawLocation> for Location {
    type Error = FetchError;

    fn try_from(raw: RawLocation) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Location {
    /// Build a location, rejecting coordinates outside the WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        // range checks let NaN through
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(FetchError::InvalidCoordinate(format!(
                "({}, {})",
                latitude, longitude
            )));
        }

        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }
}
