//! Bucketing hash.
//!
//! An identity lands in bucket `SHA-256(name + "/" + identity) mod count`,
//! where the full 256-bit digest is read as a big-endian unsigned integer.
//! The reduction is exact, so the result equals arbitrary-precision modulo.
//! Changing any part of this scheme reassigns every existing identity.

use serde_json::Value;
use sha2::{Digest, Sha256};
use splitab_core::{AbError, AlternativeId, ErrorInfo};

use crate::canonical::to_canonical_json_bytes;

/// Returns the SHA-256 digest of `experiment_name + "/" + identity`.
pub fn assignment_digest(experiment_name: &str, identity: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(experiment_name.as_bytes());
    hasher.update(b"/");
    hasher.update(identity.as_bytes());
    hasher.finalize().into()
}

/// Reduces a big-endian digest modulo `modulus`.
///
/// Horner's rule keeps the running remainder below `modulus`, so
/// `remainder * 256 + byte` fits in `u128` for any `usize` modulus.
pub fn reduce_digest(digest: &[u8], modulus: usize) -> usize {
    debug_assert!(modulus > 0);
    let modulus = modulus as u128;
    let remainder = digest
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | u128::from(*byte)) % modulus);
    remainder as usize
}

/// Maps an identity to an alternative index in `[0, alternative_count)`.
pub fn bucket_index(
    experiment_name: &str,
    identity: &str,
    alternative_count: usize,
) -> Result<AlternativeId, AbError> {
    if alternative_count == 0 {
        return Err(AbError::Definition(
            ErrorInfo::new("splitab.bucket_empty", "cannot bucket into zero alternatives")
                .with_context("experiment", experiment_name),
        ));
    }
    let digest = assignment_digest(experiment_name, identity);
    Ok(AlternativeId::from_index(reduce_digest(
        &digest,
        alternative_count,
    )))
}

/// Computes a stable hexadecimal hash of an experiment definition.
pub fn definition_hash(experiment_name: &str, values: &[Value]) -> Result<String, AbError> {
    let bytes = to_canonical_json_bytes(&(experiment_name, values))?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
