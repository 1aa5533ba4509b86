//! Content-type classification from magic bytes
//!
//! Classification never trusts the name an artifact arrived under; the
//! declared type is only compared against this result by the pipeline's
//! mismatch heuristic.

use sift_report::ContentTypeInfo;
use thiserror::Error;
use tracing::debug;

/// Classifier initialization failure.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    #[error("classifier initialization failed: {0}")]
    Init(String),
}

/// Descriptive facts about one recognized mime type.
struct TypeFacts {
    mime: &'static str,
    group: &'static str,
    description: &'static str,
    extensions: &'static [&'static str],
    is_text: bool,
}

const KNOWN_TYPES: &[TypeFacts] = &[
    TypeFacts {
        mime: "application/zip",
        group: "Archive",
        description: "ZIP compressed archive",
        extensions: &["zip"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        group: "Document",
        description: "Microsoft Word document (OpenXML)",
        extensions: &["docx"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        group: "Document",
        description: "Microsoft Excel spreadsheet (OpenXML)",
        extensions: &["xlsx"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        group: "Document",
        description: "Microsoft PowerPoint presentation (OpenXML)",
        extensions: &["pptx"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/x-executable",
        group: "Executable",
        description: "ELF executable",
        extensions: &["elf", "so"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/vnd.microsoft.portable-executable",
        group: "Executable",
        description: "Windows portable executable",
        extensions: &["exe", "dll"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/pdf",
        group: "Document",
        description: "Portable Document Format",
        extensions: &["pdf"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/gzip",
        group: "Archive",
        description: "Gzip compressed data",
        extensions: &["gz"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/x-tar",
        group: "Archive",
        description: "Tape archive",
        extensions: &["tar"],
        is_text: false,
    },
    TypeFacts {
        mime: "application/x-7z-compressed",
        group: "Archive",
        description: "7-Zip compressed archive",
        extensions: &["7z"],
        is_text: false,
    },
    TypeFacts {
        mime: "image/png",
        group: "Image",
        description: "Portable Network Graphics image",
        extensions: &["png"],
        is_text: false,
    },
    TypeFacts {
        mime: "image/jpeg",
        group: "Image",
        description: "JPEG image",
        extensions: &["jpg", "jpeg"],
        is_text: false,
    },
    TypeFacts {
        mime: "image/gif",
        group: "Image",
        description: "GIF image",
        extensions: &["gif"],
        is_text: false,
    },
    TypeFacts {
        mime: "text/plain",
        group: "Text",
        description: "Plain text",
        extensions: &["txt"],
        is_text: true,
    },
    TypeFacts {
        mime: "application/octet-stream",
        group: "Binary",
        description: "Unrecognized binary data",
        extensions: &[],
        is_text: false,
    },
];

/// Magic-byte content classifier.
///
/// Loading is async so callers can treat heavier future backends (external
/// signature databases) the same way; the built-in table loads instantly.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    _private: (),
}

impl Classifier {
    /// Initialize the classifier.
    pub async fn load() -> Result<Self, ClassifyError> {
        debug!(types = KNOWN_TYPES.len(), "content classifier loaded");
        Ok(Self { _private: () })
    }

    /// Classify raw bytes into a content-type description.
    ///
    /// Unrecognized content falls back to `text/plain` when the bytes are
    /// valid, mostly-printable UTF-8, otherwise `application/octet-stream`.
    #[must_use]
    pub fn classify(&self, data: &[u8]) -> ContentTypeInfo {
        let mime = match infer::get(data) {
            Some(kind) => normalize_mime(kind.mime_type()),
            None if looks_textual(data) => "text/plain",
            None => "application/octet-stream",
        };

        let facts = KNOWN_TYPES.iter().find(|facts| facts.mime == mime);
        match facts {
            Some(facts) => ContentTypeInfo {
                mime_type: Some(facts.mime.to_string()),
                group: Some(facts.group.to_string()),
                description: Some(facts.description.to_string()),
                extensions: facts.extensions.iter().map(|e| e.to_string()).collect(),
                is_text: facts.is_text,
            },
            None => ContentTypeInfo {
                mime_type: Some(mime.to_string()),
                group: None,
                description: None,
                extensions: Vec::new(),
                is_text: mime.starts_with("text/"),
            },
        }
    }
}

/// Map sniffer aliases onto the mime names the rest of the pipeline keys on.
fn normalize_mime(mime: &str) -> &str {
    match mime {
        "application/x-msdownload" => "application/vnd.microsoft.portable-executable",
        other => other,
    }
}

/// Heuristic text check: valid UTF-8 with no control bytes other than
/// whitespace.
fn looks_textual(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    match std::str::from_utf8(data) {
        Ok(text) => text
            .chars()
            .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t')),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn classifier() -> Classifier {
        Classifier::load().await.expect("classifier load")
    }

    #[tokio::test]
    async fn zip_magic_is_recognized() {
        let info = classifier().await.classify(b"PK\x03\x04rest-of-archive");
        assert_eq!(info.mime_type.as_deref(), Some("application/zip"));
        assert_eq!(info.group.as_deref(), Some("Archive"));
        assert!(!info.is_text);
        assert_eq!(info.extensions, vec!["zip".to_string()]);
    }

    #[tokio::test]
    async fn elf_magic_is_recognized() {
        let mut data = vec![0x7F, b'E', b'L', b'F', 0x02, 0x01, 0x01, 0x00];
        data.extend_from_slice(&[0u8; 64]);
        let info = classifier().await.classify(&data);
        assert_eq!(info.mime_type.as_deref(), Some("application/x-executable"));
        assert_eq!(info.group.as_deref(), Some("Executable"));
    }

    #[tokio::test]
    async fn printable_bytes_fall_back_to_plain_text() {
        let info = classifier().await.classify(b"hello world\nsecond line\n");
        assert_eq!(info.mime_type.as_deref(), Some("text/plain"));
        assert!(info.is_text);
    }

    #[tokio::test]
    async fn opaque_bytes_fall_back_to_octet_stream() {
        let info = classifier().await.classify(&[0x00, 0xFF, 0xFE, 0x01, 0x02]);
        assert_eq!(
            info.mime_type.as_deref(),
            Some("application/octet-stream")
        );
        assert!(!info.is_text);
    }

    #[tokio::test]
    async fn empty_input_is_not_text() {
        let info = classifier().await.classify(&[]);
        assert_eq!(
            info.mime_type.as_deref(),
            Some("application/octet-stream")
        );
    }
}
