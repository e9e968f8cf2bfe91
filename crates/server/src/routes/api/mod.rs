//! JSON API routes.

pub mod scores;
