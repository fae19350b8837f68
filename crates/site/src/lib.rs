//! Chequéalo RD site library.
//!
//! Shop directory, reviews, favorites and moderation served as a JSON API.
//! Built as a library so the router can be driven from integration tests and
//! the repositories reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
