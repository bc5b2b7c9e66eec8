//! Utility modules

pub mod contours;
pub mod image;

pub use contours::{Blob, ContourUtils};
pub use image::ImageUtils;
