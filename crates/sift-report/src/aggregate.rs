//! Report aggregation
//!
//! A pure reducer: given the current report and one incoming event, return
//! the next report. Replace-valued fields are overwritten wholesale by
//! their terminal event; append-valued fields (metadata, heuristics) only
//! grow, in arrival order. Because the reducer returns a complete value
//! and never blocks, readers of immutable snapshots cannot observe a torn
//! state.

use crate::event::{TaskEvent, TaskOutput};
use crate::types::{Report, TaskKind, TaskStatus};

/// Fold one event into the report.
#[must_use]
pub fn reduce(mut report: Report, event: TaskEvent) -> Report {
    match event {
        TaskEvent::Started(kind) => {
            report.status.advance(kind, TaskStatus::Pending);
        }
        TaskEvent::Failed { kind, .. } => {
            report.status.advance(kind, TaskStatus::Failed);
        }
        TaskEvent::Completed(output) => apply_output(&mut report, output),
    }
    report
}

fn apply_output(report: &mut Report, output: TaskOutput) {
    match output {
        TaskOutput::ContentType(info) => {
            report.content_type = Some(info);
            report.status.advance(TaskKind::ContentType, TaskStatus::Completed);
        }
        TaskOutput::Metadata(entries) => {
            // Appended regardless of interleaving; no status slot.
            report.metadata.extend(entries);
        }
        TaskOutput::Heuristic(heuristic) => {
            report.heuristics.push(heuristic);
        }
        TaskOutput::Entropy(value) => {
            report.entropy = Some(value);
            report.status.advance(TaskKind::Entropy, TaskStatus::Completed);
        }
        TaskOutput::EntropyChunks(chunks) => {
            report.entropy_chunks = chunks;
            report
                .status
                .advance(TaskKind::EntropyChunks, TaskStatus::Completed);
        }
        TaskOutput::Strings(strings) => {
            report.strings = strings;
            report.status.advance(TaskKind::Strings, TaskStatus::Completed);
        }
        TaskOutput::Ips(ips) => {
            report.ips = ips;
            report
                .status
                .advance(TaskKind::IpIndicators, TaskStatus::Completed);
        }
        TaskOutput::Urls(urls) => {
            report.urls = urls;
            report
                .status
                .advance(TaskKind::UrlIndicators, TaskStatus::Completed);
        }
        TaskOutput::Structured(structured) => {
            report.structured = Some(structured);
            report
                .status
                .advance(TaskKind::Structured, TaskStatus::Completed);
        }
    }
}
