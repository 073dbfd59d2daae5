//! Application layer - Use cases and port interfaces
//!
//! Contains the capture pipeline's coordinating logic and the trait
//! definitions for hardware, location and platform collaborators.

pub mod capture_session;
pub mod compositor;
pub mod gate;
pub mod location_feed;
pub mod orchestrator;
pub mod ports;
pub mod recording;
pub mod services;

// Re-export use cases
pub use capture_session::{CaptureError, CaptureSession};
pub use compositor::{CompositeError, DecodedImage, EncodedImage, OverlayCompositor};
pub use gate::{FlightGuard, SingleFlight};
pub use location_feed::LocationFeed;
pub use orchestrator::{CaptureOrchestrator, OrchestratorConfig, ShutterResult};
pub use recording::{RecordingController, RecordingError};
pub use services::{CaptureServices, Liveness};
