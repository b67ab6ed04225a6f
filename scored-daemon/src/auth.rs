//! Password authentication against the stored reference digest.
//!
//! The scheme is a single unsalted, uniterated SHA-512 of the candidate
//! password, rendered as 128 lowercase hex characters and compared against
//! the reference digest from the credential file. The lack of salt and
//! stretching is inherited behavior, kept as-is rather than silently
//! strengthened.

use scored_protocol::protocol::REFERENCE_DIGEST_HEX_LEN;
use scored_protocol::ResponseStatus;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Which comparison result grants access.
///
/// The ancestral implementation inverted the branch on its string compare,
/// granting access when the digests *differed*. [`AUTH_POLARITY`] pins the
/// intended semantics; flipping it reproduces the inherited behavior
/// verbatim for parity testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolarity {
    /// Equal digests grant access (intended semantics).
    MatchSucceeds,
    /// Unequal digests grant access (inherited defect, kept addressable).
    MatchFails,
}

/// Active comparison polarity. The daemon runs with the corrected
/// match-means-success semantics.
pub const AUTH_POLARITY: MatchPolarity = MatchPolarity::MatchSucceeds;

/// SHA-512 of `password`, rendered as 128 lowercase hex characters.
pub fn digest_hex(password: &str) -> String {
    let digest = Sha512::digest(password.as_bytes());
    hex::encode(digest)
}

/// Compare the candidate password against the stored reference digest.
///
/// The reference is normalized the way the credential reader produces it:
/// surrounding whitespace trimmed, at most 128 characters considered.
/// Comparison is constant-time over the hex bytes.
pub fn authenticate(reference_digest_hex: &str, candidate_password: &str) -> ResponseStatus {
    let reference = normalize_reference(reference_digest_hex);
    let candidate = digest_hex(candidate_password);

    let equal = reference.len() == candidate.len()
        && bool::from(reference.as_bytes().ct_eq(candidate.as_bytes()));

    let matched = match AUTH_POLARITY {
        MatchPolarity::MatchSucceeds => equal,
        MatchPolarity::MatchFails => !equal,
    };

    if matched {
        ResponseStatus::Success
    } else {
        ResponseStatus::AuthFail
    }
}

/// Trim surrounding whitespace and cap the reference at digest length.
fn normalize_reference(reference: &str) -> &str {
    let trimmed = reference.trim();
    // get() rather than slicing: a corrupt multibyte reference must fail
    // the comparison, not panic the engine
    trimmed.get(..REFERENCE_DIGEST_HEX_LEN).unwrap_or(trimmed)
}
