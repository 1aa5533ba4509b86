//! Pipeline task runner
//!
//! One spawn per artifact run. The runner announces every lifecycle task
//! up front, fans the analysis steps out over tokio tasks, and streams
//! [`TaskEvent`]s back over a bounded channel. Branches fail in isolation:
//! one step failing never stops the others, but a step whose input came
//! from a failed step fails with it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use sift_report::{
    ContentTypeInfo, Heuristic, MetadataEntry, Severity, StructuredReport, TaskEvent, TaskKind,
    TaskOutput,
};

use crate::gateway::EngineGateway;

/// One artifact queued for analysis.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Display name, usually the file name
    pub name: String,
    /// Raw content
    pub bytes: Arc<Vec<u8>>,
    /// Mime type the artifact was declared as, if any
    pub declared_mime: Option<String>,
}

impl Artifact {
    /// Create an artifact from raw bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes),
            declared_mime: None,
        }
    }

    /// Attach the declared mime type.
    #[must_use]
    pub fn with_declared_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.declared_mime = Some(mime_type.into());
        self
    }
}

/// Spawner for per-artifact pipeline runs.
pub struct TaskRunner;

impl TaskRunner {
    /// Start a pipeline run and return its event stream.
    ///
    /// If the analyzer backend cannot load, the run emits nothing and the
    /// stream closes immediately.
    #[must_use]
    pub fn spawn(
        gateway: EngineGateway,
        artifact: Artifact,
        secret: Option<String>,
    ) -> mpsc::Receiver<TaskEvent> {
        let (tx, rx) = mpsc::channel(gateway.config().event_capacity);
        tokio::spawn(run(gateway, artifact, secret, tx));
        rx
    }
}

async fn run(
    gateway: EngineGateway,
    artifact: Artifact,
    secret: Option<String>,
    tx: mpsc::Sender<TaskEvent>,
) {
    let analyzers = match gateway.analyzers().await {
        Ok(analyzers) => analyzers,
        Err(_) => return,
    };

    debug!(artifact = %artifact.name, "starting pipeline run");
    for kind in TaskKind::LIFECYCLE {
        emit(&tx, TaskEvent::Started(kind)).await;
    }

    let data = artifact.bytes.clone();

    {
        let (analyzers, data, tx) = (analyzers.clone(), data.clone(), tx.clone());
        tokio::spawn(async move {
            match analyzers.entropy(&data) {
                Ok(value) => emit(&tx, TaskEvent::Completed(TaskOutput::Entropy(value))).await,
                Err(e) => emit_failed(&tx, TaskKind::Entropy, &e.message).await,
            }
        });
    }

    {
        let (analyzers, data, tx) = (analyzers.clone(), data.clone(), tx.clone());
        tokio::spawn(async move {
            match analyzers.entropy_chunks(&data) {
                Ok(chunks) => {
                    emit(&tx, TaskEvent::Completed(TaskOutput::EntropyChunks(chunks))).await;
                }
                Err(e) => emit_failed(&tx, TaskKind::EntropyChunks, &e.message).await,
            }
        });
    }

    {
        let (analyzers, data, tx) = (analyzers.clone(), data.clone(), tx.clone());
        tokio::spawn(async move {
            match analyzers.digests(&data) {
                Ok(entries) => {
                    for entry in entries {
                        emit(&tx, TaskEvent::Completed(TaskOutput::Metadata(vec![entry]))).await;
                    }
                }
                Err(e) => warn!(error = %e, "digest computation failed"),
            }
        });
    }

    {
        let (analyzers, data, tx) = (analyzers.clone(), data.clone(), tx.clone());
        tokio::spawn(async move {
            let strings = match analyzers.strings(&data) {
                Ok(strings) => strings,
                Err(e) => {
                    // Indicator extraction has nothing to match over.
                    emit_failed(&tx, TaskKind::Strings, &e.message).await;
                    emit_failed(&tx, TaskKind::IpIndicators, &e.message).await;
                    emit_failed(&tx, TaskKind::UrlIndicators, &e.message).await;
                    return;
                }
            };
            emit(
                &tx,
                TaskEvent::Completed(TaskOutput::Strings(strings.clone())),
            )
            .await;

            match analyzers.ips(&strings) {
                Ok(ips) => emit(&tx, TaskEvent::Completed(TaskOutput::Ips(ips))).await,
                Err(e) => emit_failed(&tx, TaskKind::IpIndicators, &e.message).await,
            }
            match analyzers.urls(&strings) {
                Ok(urls) => emit(&tx, TaskEvent::Completed(TaskOutput::Urls(urls))).await,
                Err(e) => emit_failed(&tx, TaskKind::UrlIndicators, &e.message).await,
            }
        });
    }

    {
        let declared = artifact.declared_mime.clone();
        tokio::spawn(async move {
            let info = match analyzers.classify(&data) {
                Ok(info) => info,
                Err(e) => {
                    // No classified type means no parser to route to.
                    emit_failed(&tx, TaskKind::ContentType, &e.message).await;
                    emit_failed(&tx, TaskKind::Structured, &e.message).await;
                    return;
                }
            };

            let mime_type = info
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string());

            emit(
                &tx,
                TaskEvent::Completed(TaskOutput::ContentType(info.clone())),
            )
            .await;
            emit(
                &tx,
                TaskEvent::Completed(TaskOutput::Metadata(content_type_metadata(&info))),
            )
            .await;

            if let Some(declared) = declared {
                if declared != mime_type {
                    emit(
                        &tx,
                        TaskEvent::Completed(TaskOutput::Heuristic(Heuristic::new(
                            "Content type mismatch",
                            Severity::Medium,
                        ))),
                    )
                    .await;
                }
            }

            match analyzers.parse_structured(&mime_type, &data, secret.as_deref()) {
                Ok(parsed) => {
                    for heuristic in parsed.heuristics {
                        emit(&tx, TaskEvent::Completed(TaskOutput::Heuristic(heuristic))).await;
                    }
                    if !parsed.metadata.is_empty() {
                        emit(
                            &tx,
                            TaskEvent::Completed(TaskOutput::Metadata(parsed.metadata)),
                        )
                        .await;
                    }
                    emit(
                        &tx,
                        TaskEvent::Completed(TaskOutput::Structured(StructuredReport {
                            items: parsed.items,
                            imports: parsed.imports,
                        })),
                    )
                    .await;
                }
                Err(e) => emit_failed(&tx, TaskKind::Structured, &e.message).await,
            }
        });
    }
}

fn content_type_metadata(info: &ContentTypeInfo) -> Vec<MetadataEntry> {
    vec![
        MetadataEntry::new(
            "Mime Type",
            info.mime_type.clone().unwrap_or_else(|| "Unknown".to_string()),
        ),
        MetadataEntry::new(
            "Description",
            info.description
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        MetadataEntry::new("Is Text", info.is_text.to_string()),
        MetadataEntry::new(
            "Group",
            info.group.clone().unwrap_or_else(|| "Unknown".to_string()),
        ),
    ]
}

async fn emit(tx: &mpsc::Sender<TaskEvent>, event: TaskEvent) {
    // A closed receiver means the session moved on; drop silently.
    let _ = tx.send(event).await;
}

async fn emit_failed(tx: &mpsc::Sender<TaskEvent>, kind: TaskKind, message: &str) {
    warn!(task = %kind, error = %message, "pipeline task failed");
    emit(
        tx,
        TaskEvent::Failed {
            kind,
            error: message.to_string(),
        },
    )
    .await;
}
