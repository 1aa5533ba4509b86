//! Core types for the per-session analysis report
//!
//! Defines the fundamental vocabulary of the pipeline:
//! - `TaskKind` and `TaskStatus` with the monotonic lifecycle
//! - Findings: heuristics, metadata entries, content-type info
//! - Structured container contents and import graphs
//! - The accumulated `Report` and its completion tri-state

use crate::error::UnknownTaskError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of sub-computation categories a pipeline run tracks.
///
/// `Metadata` is special: metadata arrivals are appended to the report but
/// carry no Idle/Pending lifecycle of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Content-type classification of the artifact
    ContentType,
    /// Shannon entropy over the whole artifact
    Entropy,
    /// Entropy per fixed-size chunk
    EntropyChunks,
    /// Printable-string extraction
    Strings,
    /// IP indicators derived from extracted strings
    IpIndicators,
    /// URL indicators derived from extracted strings
    UrlIndicators,
    /// Structured-format parse (containers, executables)
    Structured,
    /// Hash/classifier facts and parser-surfaced properties
    Metadata,
}

impl TaskKind {
    /// Kinds that own a status slot in the report.
    pub const LIFECYCLE: [TaskKind; 7] = [
        TaskKind::ContentType,
        TaskKind::Entropy,
        TaskKind::EntropyChunks,
        TaskKind::Strings,
        TaskKind::IpIndicators,
        TaskKind::UrlIndicators,
        TaskKind::Structured,
    ];

    /// Kinds that must complete for the analysis to count as complete.
    pub const TRACKED: [TaskKind; 6] = [
        TaskKind::Entropy,
        TaskKind::EntropyChunks,
        TaskKind::Structured,
        TaskKind::Strings,
        TaskKind::IpIndicators,
        TaskKind::UrlIndicators,
    ];

    /// Stable name used at string boundaries (CLI, logs).
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::ContentType => "content-type",
            TaskKind::Entropy => "entropy",
            TaskKind::EntropyChunks => "entropy-chunks",
            TaskKind::Strings => "strings",
            TaskKind::IpIndicators => "ips",
            TaskKind::UrlIndicators => "urls",
            TaskKind::Structured => "structured",
            TaskKind::Metadata => "metadata",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = UnknownTaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content-type" => Ok(TaskKind::ContentType),
            "entropy" => Ok(TaskKind::Entropy),
            "entropy-chunks" => Ok(TaskKind::EntropyChunks),
            "strings" => Ok(TaskKind::Strings),
            "ips" => Ok(TaskKind::IpIndicators),
            "urls" => Ok(TaskKind::UrlIndicators),
            "structured" => Ok(TaskKind::Structured),
            "metadata" => Ok(TaskKind::Metadata),
            other => Err(UnknownTaskError(other.to_string())),
        }
    }
}

/// Status of one task kind within a pipeline run.
///
/// Transitions are monotonic: Idle -> Pending -> {Completed | Failed}.
/// A terminal status never regresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started
    #[default]
    Idle,
    /// Dispatched, result not yet in
    Pending,
    /// Finished with a result
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal (Completed or Failed).
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// One status slot per lifecycle kind.
///
/// `Metadata` has no slot: each metadata arrival is simply appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatuses {
    pub content_type: TaskStatus,
    pub entropy: TaskStatus,
    pub entropy_chunks: TaskStatus,
    pub strings: TaskStatus,
    pub ips: TaskStatus,
    pub urls: TaskStatus,
    pub structured: TaskStatus,
}

impl TaskStatuses {
    /// Current status of a kind, `None` for kinds without a lifecycle.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: TaskKind) -> Option<TaskStatus> {
        self.slot(kind).copied()
    }

    /// Advance a kind's status, enforcing monotonicity.
    ///
    /// Terminal slots ignore every further transition; nothing ever moves
    /// back to Idle. Transitions for `Metadata` are no-ops.
    pub fn advance(&mut self, kind: TaskKind, next: TaskStatus) {
        let Some(slot) = self.slot_mut(kind) else {
            return;
        };
        if slot.is_terminal() || next == TaskStatus::Idle {
            return;
        }
        *slot = next;
    }

    fn slot(&self, kind: TaskKind) -> Option<&TaskStatus> {
        match kind {
            TaskKind::ContentType => Some(&self.content_type),
            TaskKind::Entropy => Some(&self.entropy),
            TaskKind::EntropyChunks => Some(&self.entropy_chunks),
            TaskKind::Strings => Some(&self.strings),
            TaskKind::IpIndicators => Some(&self.ips),
            TaskKind::UrlIndicators => Some(&self.urls),
            TaskKind::Structured => Some(&self.structured),
            TaskKind::Metadata => None,
        }
    }

    fn slot_mut(&mut self, kind: TaskKind) -> Option<&mut TaskStatus> {
        match kind {
            TaskKind::ContentType => Some(&mut self.content_type),
            TaskKind::Entropy => Some(&mut self.entropy),
            TaskKind::EntropyChunks => Some(&mut self.entropy_chunks),
            TaskKind::Strings => Some(&mut self.strings),
            TaskKind::IpIndicators => Some(&mut self.ips),
            TaskKind::UrlIndicators => Some(&mut self.urls),
            TaskKind::Structured => Some(&mut self.structured),
            TaskKind::Metadata => None,
        }
    }
}

/// Severity attached to heuristic findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, no security concern
    Info,
    /// Minor concern
    Low,
    /// Moderate concern
    Medium,
    /// Significant risk
    High,
}

impl Severity {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// A named, severity-tagged suspicious-indicator finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristic {
    /// Name of the heuristic check
    pub name: String,
    /// Severity of the finding
    pub severity: Severity,
}

impl Heuristic {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

/// Content-type classification result. Replace semantics, one per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeInfo {
    /// Detected MIME type
    pub mime_type: Option<String>,
    /// General category (archive, executable, document, text, ...)
    pub group: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Common file extensions for this type
    pub extensions: Vec<String>,
    /// Whether the content is textual
    pub is_text: bool,
}

/// One titled metadata fact. Append-only; duplicates by title are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub title: String,
    pub value: String,
}

impl MetadataEntry {
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// File-or-directory discriminant for structured items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    File,
    Directory,
}

/// One node of a container's content listing.
///
/// `path` is slash-delimited and implies the hierarchy; `bytes` is present
/// only for file leaves whose data could be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredItem {
    pub path: String,
    pub kind: ItemKind,
    pub size: u64,
    /// Raw member data. Not serialized; reports stay lightweight on the wire.
    #[serde(skip)]
    pub bytes: Option<Vec<u8>>,
    pub encrypted: bool,
}

impl StructuredItem {
    /// Whether this item qualifies for re-submission as its own artifact.
    #[inline]
    #[must_use]
    pub fn is_scannable(&self) -> bool {
        self.kind == ItemKind::File && self.bytes.is_some() && !self.encrypted
    }
}

/// Module name -> referenced symbols, in declaration/reference order.
pub type ImportGraph = IndexMap<String, Vec<String>>;

/// Result of the structured-format parse: content listing plus imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReport {
    pub items: Vec<StructuredItem>,
    pub imports: ImportGraph,
}

/// Completion tri-state over the tracked task kinds.
///
/// A single boolean hides the difference between "still running" and
/// "finished but degraded"; consumers get all three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisProgress {
    /// At least one tracked kind is still Idle or Pending
    Running,
    /// Every tracked kind completed
    Complete,
    /// Every tracked kind is terminal, at least one failed
    CompleteWithFailures,
}

/// The accumulated, continuously-current result set for one session.
///
/// Built exclusively by folding `TaskEvent`s through [`crate::reduce`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Per-kind task statuses
    pub status: TaskStatuses,
    /// Titled facts, in arrival order
    pub metadata: Vec<MetadataEntry>,
    /// Whole-artifact Shannon entropy
    pub entropy: Option<f64>,
    /// Entropy per fixed-size chunk
    pub entropy_chunks: Vec<f64>,
    /// Extracted printable strings
    pub strings: Vec<String>,
    /// IP indicators derived from the strings
    pub ips: Vec<String>,
    /// URL indicators derived from the strings
    pub urls: Vec<String>,
    /// Content-type classification
    pub content_type: Option<ContentTypeInfo>,
    /// Structured-format parse result, when the parse succeeded
    pub structured: Option<StructuredReport>,
    /// Suspicious-indicator findings, in arrival order
    pub heuristics: Vec<Heuristic>,
}

impl Report {
    /// Fresh, all-Idle report.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completion tri-state over the tracked kinds.
    #[must_use]
    pub fn progress(&self) -> AnalysisProgress {
        let mut failed = false;
        for kind in TaskKind::TRACKED {
            match self.status.get(kind) {
                Some(TaskStatus::Completed) => {}
                Some(TaskStatus::Failed) => failed = true,
                _ => return AnalysisProgress::Running,
            }
        }
        if failed {
            AnalysisProgress::CompleteWithFailures
        } else {
            AnalysisProgress::Complete
        }
    }

    /// True iff every tracked kind completed. A failed kind leaves this
    /// false for the rest of the pipeline run.
    #[inline]
    #[must_use]
    pub fn is_analysis_complete(&self) -> bool {
        self.progress() == AnalysisProgress::Complete
    }
}
