//! HTTP request handlers.

pub mod http;
pub mod starthubs;

pub use http::*;
pub use starthubs::*;
