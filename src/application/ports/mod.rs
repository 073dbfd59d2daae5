//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod camera;
pub mod config;
pub mod location;
pub mod media_index;
pub mod permissions;
pub mod storage;
pub mod typeface;

// Re-export common types
pub use camera::{
    BindRequest, CameraDevice, DeviceCapabilities, DeviceError, PreparedRecording, RecordEvent,
    RecordingControl,
};
pub use config::ConfigStore;
pub use location::{GeocodeError, Geocoder, LocationError, LocationRequest, LocationSource};
pub use media_index::{MediaIndex, MediaIndexError};
pub use permissions::{Capability, PermissionAuthority};
pub use storage::{MediaStorage, StorageError};
pub use typeface::{GlyphBitmap, Typeface};
