//! No-op geocoder

use async_trait::async_trait;

use crate::application::ports::{GeocodeError, Geocoder};
use crate::domain::location::AddressComponents;

/// Geocoder that never finds anything
///
/// Used when reverse geocoding is disabled; snapshots keep the
/// "unavailable" description.
pub struct NoOpGeocoder;

impl NoOpGeocoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for NoOpGeocoder {
    async fn resolve(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<AddressComponents>, GeocodeError> {
        Ok(Vec::new())
    }
}
