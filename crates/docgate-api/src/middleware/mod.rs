//! Axum middleware stack.

pub mod cors;
pub mod hidden;
pub mod logging;
