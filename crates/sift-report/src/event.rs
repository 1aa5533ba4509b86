//! Pipeline event vocabulary
//!
//! A pipeline run is observed purely as a stream of `TaskEvent`s; the
//! aggregator folds them into the report and nothing else mutates it.

use crate::types::{
    ContentTypeInfo, Heuristic, MetadataEntry, StructuredReport, TaskKind, TaskStatus,
};

/// One message from a pipeline run.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A task kind was dispatched and is now pending.
    Started(TaskKind),
    /// A task kind completed with its result.
    Completed(TaskOutput),
    /// A task kind failed; siblings are unaffected.
    Failed {
        kind: TaskKind,
        error: String,
    },
}

impl TaskEvent {
    /// The kind this event addresses, where one is attributable.
    ///
    /// Completed metadata/heuristic payloads report `TaskKind::Metadata`:
    /// both are statusless append streams.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskEvent::Started(kind) => *kind,
            TaskEvent::Failed { kind, .. } => *kind,
            TaskEvent::Completed(output) => output.kind(),
        }
    }

    /// The status this event carries.
    #[inline]
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskEvent::Started(_) => TaskStatus::Pending,
            TaskEvent::Completed(_) => TaskStatus::Completed,
            TaskEvent::Failed { .. } => TaskStatus::Failed,
        }
    }
}

/// Tagged result payload of a completed task.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    /// Content-type classification (replace)
    ContentType(ContentTypeInfo),
    /// Batch of metadata entries (append, batch of one or many)
    Metadata(Vec<MetadataEntry>),
    /// One heuristic finding (append)
    Heuristic(Heuristic),
    /// Whole-artifact entropy (replace)
    Entropy(f64),
    /// Per-chunk entropy sequence (replace)
    EntropyChunks(Vec<f64>),
    /// Extracted strings (replace)
    Strings(Vec<String>),
    /// IP indicators (replace)
    Ips(Vec<String>),
    /// URL indicators (replace)
    Urls(Vec<String>),
    /// Structured parse result (replace)
    Structured(StructuredReport),
}

impl TaskOutput {
    /// The task kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutput::ContentType(_) => TaskKind::ContentType,
            TaskOutput::Metadata(_) | TaskOutput::Heuristic(_) => TaskKind::Metadata,
            TaskOutput::Entropy(_) => TaskKind::Entropy,
            TaskOutput::EntropyChunks(_) => TaskKind::EntropyChunks,
            TaskOutput::Strings(_) => TaskKind::Strings,
            TaskOutput::Ips(_) => TaskKind::IpIndicators,
            TaskOutput::Urls(_) => TaskKind::UrlIndicators,
            TaskOutput::Structured(_) => TaskKind::Structured,
        }
    }
}
