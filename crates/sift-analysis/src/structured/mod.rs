//! Structured-format parsing
//!
//! Routes artifact bytes to a format-specific parser by mime type. The
//! parsers surface member inventories, import graphs, and format-level
//! heuristics; they never recurse into members themselves.

mod archive;
mod executable;
mod pe;

use sift_report::{Heuristic, ImportGraph, MetadataEntry, StructuredItem};
use thiserror::Error;

pub(crate) use archive::parse_archive;
pub(crate) use executable::parse_elf;
pub(crate) use pe::parse_pe;

/// Mime types parsed by the archive walker. OpenXML documents are ZIP
/// containers underneath and get a macro check on top.
const ARCHIVE_MIMES: &[&str] = &[
    "application/zip",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

const ELF_MIME: &str = "application/x-executable";
const PE_MIME: &str = "application/vnd.microsoft.portable-executable";

/// Outcome of parsing one structured artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    /// Member inventory, for container formats
    pub items: Vec<StructuredItem>,
    /// Imported symbols grouped by library, for executable formats
    pub imports: ImportGraph,
    /// Format-level findings
    pub heuristics: Vec<Heuristic>,
    /// Format-level metadata entries
    pub metadata: Vec<MetadataEntry>,
}

/// Structured-parse failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The format needs a secret this parse was not given.
    ///
    /// Reserved for formats that cannot be walked at all without the
    /// secret. ZIP archives never return this: they parse successfully
    /// and flag the unreadable members instead.
    #[error("content is encrypted")]
    Encrypted,
    /// No parser handles this mime type.
    #[error("unsupported content type: {0}")]
    Unsupported(String),
    /// The bytes do not form a valid instance of the format.
    #[error("malformed {format}: {message}")]
    Malformed { format: &'static str, message: String },
}

/// Parse artifact bytes according to their classified mime type.
pub fn parse(
    mime_type: &str,
    data: &[u8],
    secret: Option<&str>,
) -> Result<ParsedReport, ParseError> {
    if ARCHIVE_MIMES.contains(&mime_type) {
        let mut report = parse_archive(data, secret)?;
        check_macros(&mut report);
        return Ok(report);
    }
    if mime_type == ELF_MIME {
        return parse_elf(data);
    }
    if mime_type == PE_MIME {
        return parse_pe(data);
    }
    Err(ParseError::Unsupported(mime_type.to_string()))
}

/// Flag VBA macro payloads anywhere in the member inventory.
fn check_macros(report: &mut ParsedReport) {
    let has_macros = report.items.iter().any(|item| item.path.contains("vba"));
    if has_macros {
        report
            .heuristics
            .push(Heuristic::new("Contain macros", sift_report::Severity::High));
    }
}
