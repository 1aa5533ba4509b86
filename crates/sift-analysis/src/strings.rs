//! String extraction and indicator matching
//!
//! Strings are the raw material for indicators of interest: IP addresses
//! and URLs are matched over the extracted string set, never over the raw
//! bytes directly. Extraction covers ASCII and UTF-16LE so indicators in
//! Windows binaries are not lost.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_strings::{BytesConfig, Encoding};
use std::collections::BTreeSet;
use tracing::warn;

static IP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)",
    )
    .expect("ip regex")
});

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url regex"));

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:https?://)?(?:www\.)?([a-zA-Z0-9-]+\.[a-zA-Z]{2,6}))").expect("domain regex")
});

/// Extract printable runs of at least `min_length` characters, scanning
/// for ASCII and UTF-16LE encodings.
#[must_use]
pub fn extract(data: &[u8], min_length: usize) -> Vec<String> {
    let config = BytesConfig::new(data.to_vec())
        .with_min_length(min_length)
        .with_encoding(Encoding::ASCII)
        .with_encoding(Encoding::UTF16LE);

    match rust_strings::strings(&config) {
        Ok(found) => found.into_iter().map(|(string, _offset)| string).collect(),
        Err(e) => {
            warn!(error = ?e, "string extraction failed");
            Vec::new()
        }
    }
}

/// Unique IPv4 addresses found in the string set, sorted.
#[must_use]
pub fn extract_ips(input: &[String]) -> Vec<String> {
    let mut ips = BTreeSet::new();
    for string in input {
        for m in IP_RE.find_iter(string) {
            ips.insert(m.as_str().to_string());
        }
    }
    ips.into_iter().collect()
}

/// Unique HTTP/HTTPS URLs with a plausible domain, sorted.
#[must_use]
pub fn extract_urls(input: &[String]) -> Vec<String> {
    let mut urls = BTreeSet::new();
    for string in input {
        for m in URL_RE.find_iter(string) {
            let candidate = m.as_str();
            if DOMAIN_RE.is_match(candidate) {
                urls.insert(candidate.to_string());
            }
        }
    }
    urls.into_iter().collect()
}
