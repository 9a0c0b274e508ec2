//! Authentication

mod errors;
mod models;
mod service;
mod session;
mod token;

pub use errors::*;
pub use models::*;
pub use service::*;
pub use session::*;
pub use token::{TokenError, is_expired, token_expiry};
