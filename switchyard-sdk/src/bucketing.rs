//! Deterministic variation assignment.
//!
//! The bucketing engine maps an identifier to a percentage bucket and walks
//! a variation table to pick the variation that owns that bucket. It is a
//! pure function of its inputs: the same identifier, salt and table always
//! produce the same value, in any process, on any host. Server-side
//! previews and independently-computed SDK assignments must agree
//! bit-for-bit, so the formula below is a wire contract, not an
//! implementation detail.
//!
//! # Formula
//!
//! ```text
//! joined     = salt "," identifier          (identifier alone if salt is empty)
//! to_hash    = joined repeated `iterations` times, ","-joined
//! digest     = SHA-256(to_hash)
//! n          = first 15 hex characters of digest, parsed base-16
//! percentage = (n mod 9999) / 9998 * 100
//! ```
//!
//! `iterations` starts at 1. In the one-in-9999 case where the reduction
//! lands exactly on 100.0, the computation is re-run with `iterations + 1`
//! so the result always lies in `[0, 100)`.
//!
//! The salt exists so two flags can independently rebucket the same
//! identifier without correlated outcomes; callers use the flag title.

use ring::digest;

use crate::objects::flag::Variation;

/// Modulus of the percentage reduction. Part of the wire contract.
const BUCKET_MODULUS: u64 = 9999;

/// Compute the percentage bucket for a list of object ids.
///
/// `object_ids` are joined with `","`, the joined string is repeated
/// `iterations` times (again `","`-joined), and the result is hashed and
/// reduced as described in the module docs. Returns a value in `[0, 100)`.
pub fn hashed_percentage(object_ids: &[&str], iterations: usize) -> f64 {
    let joined = object_ids.join(",");
    let to_hash = vec![joined; iterations.max(1)].join(",");

    let digest = digest::digest(&digest::SHA256, to_hash.as_bytes());
    // First 15 hex characters == top 60 bits of the first 8 digest bytes.
    let mut n = 0u64;
    for byte in &digest.as_ref()[..8] {
        n = (n << 8) | u64::from(*byte);
    }
    n >>= 4;

    let percentage = (n % BUCKET_MODULUS) as f64 / (BUCKET_MODULUS - 1) as f64 * 100.0;
    if percentage >= 100.0 {
        return hashed_percentage(object_ids, iterations + 1);
    }
    percentage
}

/// Percentage bucket for one identifier under a salt.
pub fn percentage(identifier: &str, salt: &str) -> f64 {
    if salt.is_empty() {
        hashed_percentage(&[identifier], 1)
    } else {
        hashed_percentage(&[salt, identifier], 1)
    }
}

/// Assign a variation to `identifier`.
///
/// Walks the table in fixed order — the default variation's portion first,
/// then each extra variation — and returns the value of the first variation
/// whose cumulative portion boundary exceeds the computed percentage. Any
/// percentage not claimed by the table falls back to the default value.
///
/// Portions are consumed as supplied; the engine never validates them and
/// never fails.
pub fn assign<'a>(
    identifier: &str,
    salt: &str,
    default: &'a Variation,
    variations: &'a [Variation],
) -> &'a str {
    let percentage = percentage(identifier, salt);

    let mut cumulative = f64::from(default.portion);
    if percentage < cumulative {
        return &default.value;
    }
    for variation in variations {
        cumulative += f64::from(variation.portion);
        if percentage < cumulative {
            return &variation.value;
        }
    }
    &default.value
}
