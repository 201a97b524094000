//! Data access layer
//!
//! Repositories own all SQL; services never touch the pool directly.

mod refresh_token;
mod user;

pub use refresh_token::{RefreshTokenRecord, RefreshTokenRepository};
pub use user::{UserRecord, UserRepository};
