//! # docgate-storage
//!
//! Local storage for topic documents. Every topic owns one directory under
//! the storage root:
//!
//! ```text
//! <root>/<topic>/<file>
//! <root>/<topic>/<file>-history/<file>.txt        metadata sidecar
//! <root>/<topic>/<file>-history/<n>/key.txt
//! <root>/<topic>/<file>-history/<n>/prev<ext>
//! <root>/<topic>/<file>-history/<n>/diff.zip
//! <root>/<topic>/<file>-history/<n>/changes.txt
//! ```
//!
//! Only this crate writes beneath a topic directory. Callers serialise
//! mutations of one topic through [`TopicLocks`].

pub mod lock;
pub mod metadata;
pub mod paths;
pub mod topic;
pub mod version;

pub use lock::TopicLocks;
pub use metadata::FileMetadata;
pub use paths::{ArtifactKind, HistoryRoot, PathResolver};
pub use topic::TopicStore;
pub use version::{HistoryState, Inconsistency, VersionStore};
