//! Config-driven permission authority

use crate::application::ports::{Capability, PermissionAuthority};
use crate::domain::config::AppConfig;

/// Answers capability checks from the `[permissions]` config section.
/// Camera and storage access are implied by running the pipeline at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigPermissions {
    microphone: bool,
    location: bool,
}

impl ConfigPermissions {
    pub fn new(microphone: bool, location: bool) -> Self {
        Self {
            microphone,
            location,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.microphone_granted_or_default(),
            config.location_granted_or_default(),
        )
    }
}

impl PermissionAuthority for ConfigPermissions {
    fn is_granted(&self, capability: Capability) -> bool {
        match capability {
            Capability::Camera | Capability::MediaStorage => true,
            Capability::Microphone => self.microphone,
            Capability::FineLocation => self.location,
        }
    }
}
