//! Nominatim reverse-geocoding adapter

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{GeocodeError, Geocoder};
use crate::domain::location::AddressComponents;

/// Nominatim's usage policy requires an identifying user agent
const USER_AGENT: &str = concat!("geocam/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Response types for the /reverse endpoint

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    name: Option<String>,
    address: Option<Address>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    amenity: Option<String>,
    building: Option<String>,
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    suburb: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Reverse geocoder backed by a Nominatim server
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    /// Create a geocoder for the given server (e.g. `https://nominatim.openstreetmap.org`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build the reverse lookup URL
    fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url)
    }

    /// Map a response onto address components. Nominatim reports misses
    /// as an `error` field, which is an empty result, not a failure.
    fn components(response: ReverseResponse) -> Vec<AddressComponents> {
        if let Some(error) = response.error {
            debug!(%error, "No address at location");
            return Vec::new();
        }
        let Some(address) = response.address else {
            return Vec::new();
        };

        let street = match (&address.house_number, &address.road) {
            (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
            (None, Some(road)) => Some(road.clone()),
            _ => None,
        };
        let feature_name = non_empty(response.name)
            .or_else(|| address.amenity.clone())
            .or_else(|| address.building.clone())
            .or(street);

        vec![AddressComponents {
            feature_name,
            locality: address
                .city
                .or(address.town)
                .or(address.village)
                .or(address.suburb),
            admin_area: address.state,
            country_name: address.country,
        }]
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<AddressComponents>, GeocodeError> {
        let response = self
            .client
            .get(self.reverse_url())
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Request(format!("HTTP {}", status)));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        Ok(Self::components(body))
    }
}
