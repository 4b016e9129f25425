//! URL handling module for Pulse-Scraper
//!
//! This module provides URL normalization and the content fingerprint used to
//! address a task and its result history.

mod normalize;

use crate::task::TaskKey;
use md5::{Digest, Md5};

pub use normalize::{normalize_url, target_url};

/// Computes the task key for an already-normalized URL
///
/// The key is the hex MD5 digest of the URL text. MD5 is used purely as a fast,
/// stable content fingerprint for addressing; no security property depends on it.
///
/// # Examples
///
/// ```
/// use pulse_scraper::url::{fingerprint, normalize_url};
///
/// let key = fingerprint(&normalize_url("http://example.com/").unwrap());
/// assert_eq!(key.as_str(), "a9b9f04336ce0181a08e774e01113b31");
/// ```
pub fn fingerprint(normalized_url: &str) -> TaskKey {
    let mut hasher = Md5::new();
    hasher.update(normalized_url.as_bytes());
    TaskKey::new(hex::encode(hasher.finalize()))
}
