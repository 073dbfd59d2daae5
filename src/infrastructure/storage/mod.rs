//! Media storage adapters

mod output_dir;

pub use output_dir::OutputDirectory;
