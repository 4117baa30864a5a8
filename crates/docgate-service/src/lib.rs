//! # docgate-service
//!
//! Business logic service layer for DocGate. Each service orchestrates
//! topic storage, the version store, the document server, and permission
//! checks to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod access;
pub mod context;
pub mod convert;
pub mod editor;
pub mod links;
pub mod topic;
pub mod track;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use convert::{ConvertResult, ConvertService};
pub use editor::{EditorConfig, EditorOptions, EditorService};
pub use links::StorageLinks;
pub use topic::TopicService;
pub use track::{DocumentTracker, SaveReport, TrackAction, TrackOutcome, TrackPayload, TrackStatus};
