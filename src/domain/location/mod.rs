//! Location domain module

mod address;
mod coordinates;
mod snapshot;

pub use address::{AddressComponents, PlaceDescription, UNAVAILABLE_DESCRIPTION};
pub use coordinates::{Coordinates, LocationFix};
pub use snapshot::LocationSnapshot;
