//! External collaborators used by handlers.

pub mod image;

pub use image::{ImageSearch, PexelsClient};
