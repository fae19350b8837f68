//! Core types for Chequéalo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod geo;
pub mod id;
pub mod patch;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use geo::{Coordinates, CoordinatesError, EARTH_RADIUS_KM, distance_km};
pub use id::*;
pub use patch::{ShopFields, ShopPatch};
pub use rating::{Rating, RatingError};
pub use status::*;
