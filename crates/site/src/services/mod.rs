//! Business logic services for the directory.
//!
//! # Services
//!
//! - `auth` - Email/password accounts
//! - `reviews` - Reviews, the one-time edit and owner replies
//! - `favorites` - Saved shops
//! - `moderation` - Claim and update-request workflow
//!
//! Every operation takes the [`Caller`] it runs as.

pub mod auth;
pub mod caller;
pub mod error;
pub mod favorites;
pub mod moderation;
pub mod reviews;

pub use caller::Caller;
pub use error::{Duplicate, ServiceError};
pub use favorites::FavoriteService;
pub use moderation::ModerationService;
pub use reviews::ReviewService;
