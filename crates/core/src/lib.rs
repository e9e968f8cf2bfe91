//! TetriBASS Core - Shared domain types and UI state machines.
//!
//! This crate is used by:
//! - `server` - HTTP server (auth, routes, score persistence)
//! - `cli` - Command-line tools for migrations
//! - `web` - Browser bindings that drive the prompt overlay
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure state machines - no I/O,
//! no database access, no HTTP clients. The game mechanics themselves belong to
//! the external game engine; this crate only models what sits around it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails and the capped score history
//! - [`prompt`] - The pause/prompt overlay controller

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod prompt;
pub mod types;

pub use types::*;
