//! Shared domain types.

pub mod document;
pub mod topic;

pub use document::{DocumentType, base_name, extension, file_name};
pub use topic::TopicId;
