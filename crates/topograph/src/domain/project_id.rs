//! Project id generation.
//!
//! Ids have the form `{slug}-{suffix}` (e.g. `checkout-flow-k3x9a2`). The
//! slug is derived from the project name; the suffix is a base36 slice of a
//! SHA256 digest over the name, the current time and a process-wide
//! counter, so two projects with the same name get different ids without a
//! lookup.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

use super::ProjectId;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix appended to every project slug.
pub const PROJECT_SUFFIX_LENGTH: usize = 6;

/// Slug used when the name has no alphanumeric characters.
const FALLBACK_SLUG: &str = "project";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Lowercase `name`, keep ASCII alphanumerics and collapse every other run
/// of characters into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

impl ProjectId {
    /// Generate a fresh id for a project called `name`.
    pub fn generate(name: &str) -> Self {
        let slug = slugify(name);
        let slug = if slug.is_empty() {
            FALLBACK_SLUG
        } else {
            slug.as_str()
        };
        Self(format!("{slug}-{}", random_suffix(name)))
    }
}

fn random_suffix(name: &str) -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros());
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(format!("{name}|{nanos}|{sequence}").as_bytes());
    let digest = hasher.finalize();

    encode_base36(&digest[..8], PROJECT_SUFFIX_LENGTH)
}

/// Encode up to 8 bytes as a fixed-length base36 string.
///
/// Wrapping arithmetic keeps the conversion deterministic; only the low
/// `length` base36 digits are kept.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut digits = Vec::with_capacity(length);
    while digits.len() < length {
        digits.push(char::from(BASE36_CHARS[(num % 36) as usize]));
        num /= 36;
    }
    digits.iter().rev().collect()
}
