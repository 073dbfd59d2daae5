//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the filesystem, fonts, Nominatim, etc.

pub mod camera;
pub mod config;
pub mod geocoding;
pub mod location;
pub mod media_index;
pub mod permissions;
pub mod storage;
pub mod typeface;

// Re-export adapters
pub use camera::{VirtualCamera, VirtualFrame};
pub use config::XdgConfigStore;
pub use geocoding::{
    create_geocoder, select_geocoder, FixedAddressGeocoder, NoOpGeocoder, NominatimGeocoder,
};
pub use location::FixedLocationSource;
pub use media_index::{create_media_index, CommandMediaIndex, LogMediaIndex};
pub use permissions::ConfigPermissions;
pub use storage::OutputDirectory;
pub use typeface::{locate_system_font, FontError, FontdueTypeface};
