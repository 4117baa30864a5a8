//! Collaborator traits defined in `docgate-core` and implemented by other crates.

pub mod document_service;
pub mod permission;

pub use document_service::{CommandRequest, ConversionOutcome, ConversionRequest, DocumentService};
pub use permission::PermissionChecker;
