//! Location source adapters

mod fixed;

pub use fixed::FixedLocationSource;
