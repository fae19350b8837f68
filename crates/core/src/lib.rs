//! Chequéalo Core - Shared types library.
//!
//! This crate provides common types used across all Chequéalo components:
//! - `site` - Public shop directory and moderation API
//! - `cli` - Command-line tools for migrations and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, ratings, coordinates, request statuses
//!   and the typed shop patch carried by update requests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
