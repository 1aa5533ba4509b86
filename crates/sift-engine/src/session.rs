//! Session management
//!
//! One session per artifact under triage. Each session owns a live report
//! that a pump task folds pipeline events into. Re-running a session
//! (retry with a secret) swaps in a fresh report so a stale pump can never
//! write into the new run.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use sift_report::{reduce, AnalysisProgress, Report};

use crate::error::SessionError;
use crate::gateway::EngineGateway;
use crate::runner::{Artifact, TaskRunner};

/// Unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One artifact under triage.
#[derive(Debug)]
struct Session {
    id: SessionId,
    name: String,
    bytes: Arc<Vec<u8>>,
    declared_mime: Option<String>,
    depth: usize,
    report: Arc<RwLock<Report>>,
}

/// Descriptive view of one open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session identifier
    pub id: SessionId,
    /// Artifact name
    pub name: String,
    /// Nesting depth; 0 for top-level artifacts
    pub depth: usize,
}

/// Owner of all open sessions and the current selection.
///
/// Designed for single-owner use: one control task holds the manager and
/// serializes operations, while pump tasks write reports concurrently.
pub struct SessionManager {
    gateway: EngineGateway,
    sessions: Vec<Session>,
    selection: Option<usize>,
}

impl SessionManager {
    /// Create a manager over the given gateway.
    #[must_use]
    pub fn new(gateway: EngineGateway) -> Self {
        Self {
            gateway,
            sessions: Vec::new(),
            selection: None,
        }
    }

    /// Open a session for a new artifact and start its pipeline.
    ///
    /// The new session becomes the selected one. Must be called within a
    /// tokio runtime.
    pub fn open(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        declared_mime: Option<String>,
    ) -> SessionId {
        self.open_at_depth(name.into(), Arc::new(bytes), declared_mime, 0, None)
    }

    /// Open a session whose first pipeline run already carries a
    /// decryption secret.
    pub fn open_with_secret(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        declared_mime: Option<String>,
        secret: impl Into<String>,
    ) -> SessionId {
        self.open_at_depth(
            name.into(),
            Arc::new(bytes),
            declared_mime,
            0,
            Some(secret.into()),
        )
    }

    /// Close a session.
    ///
    /// Closing the selected session moves the selection to the previous
    /// position, clamped to the first remaining session. Closing any
    /// other session leaves the selection on the same session.
    pub fn close(&mut self, id: SessionId) -> Result<(), SessionError> {
        let index = self.index_of(id)?;
        let session = self.sessions.remove(index);
        info!(session = %session.id, name = %session.name, "session closed");

        self.selection = match self.selection {
            Some(selected) if selected == index => {
                if self.sessions.is_empty() {
                    None
                } else {
                    Some(index.saturating_sub(1).min(self.sessions.len() - 1))
                }
            }
            // Removal before the selection shifts its stored index down.
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        Ok(())
    }

    /// Re-run a session's pipeline with a decryption secret.
    ///
    /// The session's report is replaced by the new run from scratch;
    /// events from the abandoned run land in the orphaned report.
    pub fn retry_with_secret(
        &mut self,
        id: SessionId,
        secret: impl Into<String>,
    ) -> Result<(), SessionError> {
        let index = self.index_of(id)?;
        let session = &mut self.sessions[index];
        session.report = Arc::new(RwLock::new(Report::new()));

        let artifact = artifact_for(session);
        start_pipeline(
            &self.gateway,
            artifact,
            Some(secret.into()),
            session.report.clone(),
        );
        Ok(())
    }

    /// Open a nested session over one member of a session's structured
    /// report, by member path.
    pub fn scan_member(
        &mut self,
        id: SessionId,
        member_path: &str,
    ) -> Result<SessionId, SessionError> {
        let index = self.index_of(id)?;
        let session = &self.sessions[index];

        let depth = session.depth + 1;
        let max = self.gateway.config().max_rescan_depth;
        if depth > max {
            return Err(SessionError::ScanDepthExceeded { max });
        }

        let report = session.report.read();
        let item = report
            .structured
            .as_ref()
            .and_then(|s| s.items.iter().find(|item| item.path == member_path))
            .ok_or_else(|| SessionError::MemberNotFound(member_path.to_string()))?;

        if item.kind == sift_report::ItemKind::Directory {
            return Err(SessionError::NotAFile(member_path.to_string()));
        }
        if item.encrypted {
            return Err(SessionError::MemberEncrypted(member_path.to_string()));
        }
        let Some(bytes) = item.bytes.clone() else {
            return Err(SessionError::MemberDataUnavailable(member_path.to_string()));
        };
        drop(report);

        let id = self.open_at_depth(member_path.to_string(), Arc::new(bytes), None, depth, None);
        Ok(id)
    }

    /// Snapshot of a session's report.
    pub fn report(&self, id: SessionId) -> Result<Report, SessionError> {
        let index = self.index_of(id)?;
        Ok(self.sessions[index].report.read().clone())
    }

    /// Completion state of a session's pipeline run.
    pub fn progress(&self, id: SessionId) -> Result<AnalysisProgress, SessionError> {
        let index = self.index_of(id)?;
        Ok(self.sessions[index].report.read().progress())
    }

    /// Whether every tracked task finished without failure.
    pub fn is_analysis_complete(&self, id: SessionId) -> Result<bool, SessionError> {
        Ok(self.progress(id)? == AnalysisProgress::Complete)
    }

    /// The selected session, if any.
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<SessionId> {
        self.selection.map(|index| self.sessions[index].id)
    }

    /// Select a session by id.
    pub fn select(&mut self, id: SessionId) -> Result<(), SessionError> {
        self.selection = Some(self.index_of(id)?);
        Ok(())
    }

    /// All open sessions, in open order.
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionInfo> {
        self.sessions
            .iter()
            .map(|session| SessionInfo {
                id: session.id,
                name: session.name.clone(),
                depth: session.depth,
            })
            .collect()
    }

    /// Number of open sessions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are open.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn open_at_depth(
        &mut self,
        name: String,
        bytes: Arc<Vec<u8>>,
        declared_mime: Option<String>,
        depth: usize,
        secret: Option<String>,
    ) -> SessionId {
        let session = Session {
            id: SessionId::new(),
            name,
            bytes,
            declared_mime,
            depth,
            report: Arc::new(RwLock::new(Report::new())),
        };
        info!(session = %session.id, name = %session.name, depth, "session opened");

        let artifact = artifact_for(&session);
        start_pipeline(&self.gateway, artifact, secret, session.report.clone());

        let id = session.id;
        self.sessions.push(session);
        self.selection = Some(self.sessions.len() - 1);
        id
    }

    fn index_of(&self, id: SessionId) -> Result<usize, SessionError> {
        self.sessions
            .iter()
            .position(|session| session.id == id)
            .ok_or(SessionError::NotFound)
    }
}

fn artifact_for(session: &Session) -> Artifact {
    Artifact {
        name: session.name.clone(),
        bytes: session.bytes.clone(),
        declared_mime: session.declared_mime.clone(),
    }
}

/// Start a pipeline run and pump its events into the given report.
fn start_pipeline(
    gateway: &EngineGateway,
    artifact: Artifact,
    secret: Option<String>,
    report: Arc<RwLock<Report>>,
) {
    let mut rx = TaskRunner::spawn(gateway.clone(), artifact, secret);
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let mut guard = report.write();
            let next = reduce(std::mem::take(&mut *guard), event);
            *guard = next;
        }
        debug!("pipeline event stream closed");
    });
}
