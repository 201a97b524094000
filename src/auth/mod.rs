//! Authentication module
//!
//! Provides JWT-based authentication with argon2 password hashing.
//! Access and refresh tokens use separate signing keys.

mod jwt;
mod middleware;
mod password;

pub use jwt::{AccessClaims, JwtService, RefreshClaims, TokenError};
pub use middleware::AuthUser;
pub use password::PasswordService;
