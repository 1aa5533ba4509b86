//! PE executable import extraction
//!
//! Walks the import directory of a Windows portable executable and groups
//! imported functions by DLL. Ordinal-only imports are recorded by their
//! ordinal number.

use exe::{CCharString, ImportData, ImportDirectory, VecPE};
use sift_report::ImportGraph;
use tracing::warn;

use super::{ParseError, ParsedReport};

pub(crate) fn parse_pe(data: &[u8]) -> Result<ParsedReport, ParseError> {
    let image = VecPE::from_disk_data(data);

    let directory = match ImportDirectory::parse(&image) {
        Ok(directory) => directory,
        Err(e) => {
            warn!(error = ?e, "pe import directory unreadable, reporting empty imports");
            return Ok(ParsedReport::default());
        }
    };

    let mut imports = ImportGraph::new();
    for descriptor in directory.descriptors {
        let Ok(name) = descriptor.get_name(&image) else {
            continue;
        };
        let Ok(library) = name.as_str() else {
            continue;
        };

        let functions = imports.entry(library.to_string()).or_default();
        if let Ok(entries) = descriptor.get_imports(&image) {
            for entry in entries {
                match entry {
                    ImportData::Ordinal(ordinal) => functions.push(ordinal.to_string()),
                    ImportData::ImportByName(function) => functions.push(function.to_string()),
                }
            }
        }
    }

    Ok(ParsedReport {
        imports,
        ..ParsedReport::default()
    })
}
