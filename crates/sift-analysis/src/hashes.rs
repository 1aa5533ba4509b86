//! Cryptographic digests over artifact bytes

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Lowercase hex MD5 digest.
#[must_use]
pub fn md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Lowercase hex SHA1 digest.
#[must_use]
pub fn sha1(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Lowercase hex SHA256 digest.
#[must_use]
pub fn sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
