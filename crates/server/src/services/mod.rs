//! Business logic services.
//!
//! # Services
//!
//! - `identity` - Google sign-in, session mapping and score recording

pub mod identity;

pub use identity::{AuthError, IdentityService, UserStore};
