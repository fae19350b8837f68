//! Domain models for the directory.
//!
//! Row types derive `sqlx::FromRow` and are serialized straight into API
//! responses; request payloads live with the services and routes that
//! accept them.

pub mod moderation;
pub mod review;
pub mod session;
pub mod shop;
pub mod user;

pub use moderation::{ClaimRequest, ClaimWithShop, NewClaim, UpdateRequest, UpdateWithShop};
pub use review::{Reply, Review, ReviewView, UserReview};
pub use session::{CurrentUser, LocationFix};
pub use shop::{FavoriteShop, ListedShop, OwnedShop, Shop};
pub use user::{ProfileStats, User};
