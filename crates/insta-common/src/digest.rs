//! Password digests
//!
//! Secrets are never persisted in clear text. The stored form is the
//! standard (padded) base64 encoding of the SHA-256 of the raw password bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Compute the stored digest for a password
pub fn password_digest(password: &str) -> String {
    let hash = Sha256::digest(password.as_bytes());
    STANDARD.encode(hash)
}

/// Check a candidate password against a stored digest
pub fn verify_password(password: &str, digest: &str) -> bool {
    password_digest(password) == digest
}
