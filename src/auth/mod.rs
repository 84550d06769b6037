//! Authentication: sign-up, sign-in, password hashing, JWT.

mod handlers;
mod jwt;
pub mod password;

pub use handlers::{sign_in, sign_up};
pub use jwt::{Claims, TokenError, TokenService};
