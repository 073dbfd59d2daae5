//! Overlay typeface adapters

mod fontdue;

pub use self::fontdue::{locate_system_font, FontError, FontdueTypeface};
