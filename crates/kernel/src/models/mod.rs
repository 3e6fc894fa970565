//! Database models.

pub mod access_log;
pub mod rating;
pub mod request;
pub mod response;
pub mod translation;
pub mod user;

pub use access_log::{AccessFlags, TranslationAccessLog};
pub use rating::{Rating, RatingSummary, RatingValue};
pub use request::TranslationRequest;
pub use response::{TranslationMode, TranslationResponse};
pub use translation::Translation;
pub use user::{NewUser, User};
