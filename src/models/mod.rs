//! Data models for users and starthubs.

pub mod starthub;
pub mod user;
pub mod validation;

pub use starthub::*;
pub use user::*;
