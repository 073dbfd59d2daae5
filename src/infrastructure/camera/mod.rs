//! Camera device adapters

mod virtual_camera;

pub use virtual_camera::{VirtualCamera, VirtualFrame};
