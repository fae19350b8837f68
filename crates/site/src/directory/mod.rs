//! Listing logic over an in-memory shop list.
//!
//! Everything here is pure: the route loads the shops with their rating
//! aggregate, then these functions filter, rank and order them.

pub mod geo;
pub mod location;
pub mod search;

pub use geo::{near_me, parse_map_link, shop_coordinates};
pub use location::{LocationFailure, LocationReport};
pub use search::{FeaturedPolicy, FeaturedStrategy, listing, rank_featured, search};
