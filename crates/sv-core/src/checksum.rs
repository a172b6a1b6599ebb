//! SHA-256 checksums of migration script text.

use sha2::{Digest, Sha256};

/// Compute the hex SHA-256 of a script body
pub fn script_checksum(sql: &str) -> String {
    let digest = Sha256::digest(sql.as_bytes());
    format!("{:x}", digest)
}

/// First 12 hex characters, for log lines
pub fn short_checksum(checksum: &str) -> &str {
    checksum.get(..12).unwrap_or(checksum)
}
