//! Business logic layer

mod session;

pub use session::SessionService;
