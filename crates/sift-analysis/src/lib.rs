//! Sift Analysis - byte-level analysis primitives
//!
//! The leaf computations the pipeline fans out over an artifact:
//! - Shannon entropy, whole-artifact and per-chunk
//! - Cryptographic digests (MD5, SHA1, SHA256)
//! - Printable-string extraction and IP/URL indicator matching
//! - Content-type classification from magic bytes
//! - Structured-format parsing (archives, ELF and PE executables)
//!
//! Every function here is synchronous and pure over its input bytes; the
//! engine crate decides what runs concurrently with what.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classify;
pub mod entropy;
pub mod hashes;
pub mod strings;
pub mod structured;

pub use classify::{Classifier, ClassifyError};
pub use entropy::{by_chunks, shannon, ChunkEntropy};
pub use structured::{parse, ParseError, ParsedReport};

/// Default chunk size for per-chunk entropy, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Default minimum printable-run length for string extraction.
pub const DEFAULT_MIN_STRING_LENGTH: usize = 5;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
