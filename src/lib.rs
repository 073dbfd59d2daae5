//! GeoCam - geotagged photo capture pipeline
//!
//! This crate drives a camera through bind, capture and recording, tracks the
//! device location with reverse geocoding, and burns a location/time overlay
//! into captured photos before registering them with the media index.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, state machines, overlay text and errors
//! - **Application**: Capture session, recording, location feed, compositor,
//!   orchestrator, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (virtual camera, Nominatim,
//!   fontdue, filesystem storage, config)
//! - **CLI**: Command-line interface, argument parsing, and output formatting

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
