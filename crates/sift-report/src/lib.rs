//! Sift Report - report model and aggregation
//!
//! The typed result model for one artifact under analysis:
//! - Task kinds, statuses, and their monotonic lifecycle
//! - The per-session `Report` and every field it accumulates
//! - The event stream vocabulary emitted by pipeline runs
//! - The pure reducer that folds events into a report
//! - Tree reconstruction for structured container contents
//!
//! Everything here is synchronous and side-effect free; the engine crate
//! owns the concurrency around it.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod error;
pub mod event;
pub mod tree;
pub mod types;

// Re-exports for convenience
pub use aggregate::reduce;
pub use error::UnknownTaskError;
pub use event::{TaskEvent, TaskOutput};
pub use tree::{build_tree, TreeNode};
pub use types::{
    AnalysisProgress, ContentTypeInfo, Heuristic, ImportGraph, ItemKind, MetadataEntry, Report,
    Severity, StructuredItem, StructuredReport, TaskKind, TaskStatus, TaskStatuses,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with sift reports
    pub use crate::{
        reduce, AnalysisProgress, ContentTypeInfo, Heuristic, MetadataEntry, Report, Severity,
        StructuredItem, StructuredReport, TaskEvent, TaskKind, TaskOutput, TaskStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
