//! ZIP archive member extraction
//!
//! Every member starts out marked encrypted and is cleared only when its
//! bytes actually read out, so a wrong or missing secret shows up as
//! encrypted members rather than a hard failure.

use std::io::{Cursor, Read};

use sift_report::{Heuristic, ItemKind, Severity, StructuredItem};
use tracing::{debug, warn};

use super::{ParseError, ParsedReport};

pub(crate) fn parse_archive(
    data: &[u8],
    secret: Option<&str>,
) -> Result<ParsedReport, ParseError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| ParseError::Malformed {
            format: "zip",
            message: e.to_string(),
        })?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    debug!(members = names.len(), "walking archive");

    let mut items = Vec::with_capacity(names.len());
    for name in names {
        let mut item = StructuredItem {
            path: name.clone(),
            kind: ItemKind::File,
            size: 0,
            bytes: None,
            encrypted: true,
        };

        let member = match secret {
            Some(secret) => archive.by_name_decrypt(&name, secret.as_bytes()),
            None => archive.by_name(&name),
        };

        match member {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                match file.read_to_end(&mut bytes) {
                    Ok(_) => {
                        item.kind = if file.is_dir() {
                            ItemKind::Directory
                        } else {
                            ItemKind::File
                        };
                        item.size = file.size();
                        item.bytes = Some(bytes);
                        item.encrypted = false;
                    }
                    Err(e) => {
                        warn!(member = %name, error = %e, "failed to read archive member");
                    }
                }
            }
            Err(e) => {
                warn!(member = %name, error = %e, "failed to open archive member");
            }
        }

        items.push(item);
    }

    let mut heuristics = Vec::new();
    if items.iter().any(|item| item.encrypted) {
        heuristics.push(Heuristic::new(
            "Encrypted files found in ZIP archive",
            Severity::Medium,
        ));
    }
    if secret.is_some() {
        heuristics.push(Heuristic::new("Archive is encrypted", Severity::Info));
    }

    Ok(ParsedReport {
        items,
        heuristics,
        ..ParsedReport::default()
    })
}
