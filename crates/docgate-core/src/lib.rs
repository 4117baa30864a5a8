//! # docgate-core
//!
//! Core crate for DocGate. Contains the collaborator traits, configuration
//! schemas, topic and file-name types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocGate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
