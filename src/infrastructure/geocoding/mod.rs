//! Reverse-geocoding adapters

mod fixed;
mod nominatim;
mod noop;

pub use fixed::FixedAddressGeocoder;
pub use nominatim::NominatimGeocoder;
pub use noop::NoOpGeocoder;

use crate::application::ports::Geocoder;

/// Create the geocoder for the given server, or a no-op one when disabled
pub fn create_geocoder(base_url: Option<&str>) -> Box<dyn Geocoder> {
    match base_url {
        Some(url) => Box::new(NominatimGeocoder::new(url)),
        None => Box::new(NoOpGeocoder::new()),
    }
}

/// Create the geocoder for a capture: a fixed address wins over the server
pub fn select_geocoder(address: Option<&str>, base_url: Option<&str>) -> Box<dyn Geocoder> {
    match address.map(str::trim).filter(|a| !a.is_empty()) {
        Some(text) => Box::new(FixedAddressGeocoder::new(text)),
        None => create_geocoder(base_url),
    }
}
