//! Permission authority port interface

use std::fmt;

/// Capabilities the pipeline may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Camera,
    Microphone,
    FineLocation,
    MediaStorage,
}

impl Capability {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::FineLocation => "fine-location",
            Self::MediaStorage => "media-storage",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Port answering whether a capability was granted.
/// The pipeline only gates behavior on the answer; it never asks for grants.
pub trait PermissionAuthority: Send + Sync {
    fn is_granted(&self, capability: Capability) -> bool;
}
