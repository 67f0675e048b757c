// SPDX-License-Identifier: MIT OR Apache-2.0
//! Response bucketing and plurality tallying.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::ParticipantResponse;

/// Normalization key for grouping equivalent responses.
///
/// Lowercase, trim surrounding whitespace, SHA-256, first 16 hex chars.
#[must_use]
pub fn normalize_key(response: &str) -> String {
    let normalized = response.to_lowercase();
    let digest = Sha256::digest(normalized.trim().as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Pick the plurality bucket.
///
/// Returns `(winner, confidence)` where the winner is the *first* response
/// of the largest bucket and `confidence = |bucket| / |responses|`. Ties
/// break in favor of the bucket encountered first in response order; an
/// empty slice yields `("", 0.0)`.
#[must_use]
pub fn tally(responses: &[ParticipantResponse]) -> (String, f64) {
    if responses.is_empty() {
        return (String::new(), 0.0);
    }

    let mut order: Vec<&str> = Vec::new();
    let mut buckets: HashMap<String, Vec<&ParticipantResponse>> = HashMap::new();
    for response in responses {
        let key = normalize_key(&response.response);
        let bucket = buckets.entry(key).or_default();
        if bucket.is_empty() {
            order.push(&response.response);
        }
        bucket.push(response);
    }

    let mut best_count = 0;
    let mut winner = "";
    for first_response in &order {
        let count = buckets[&normalize_key(first_response)].len();
        if count > best_count {
            best_count = count;
            winner = first_response;
        }
    }

    (winner.to_string(), best_count as f64 / responses.len() as f64)
}
