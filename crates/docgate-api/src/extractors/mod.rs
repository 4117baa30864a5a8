//! Custom Axum extractors.

pub mod auth;
pub mod links;

pub use auth::AuthUser;
pub use links::ServerLinks;
