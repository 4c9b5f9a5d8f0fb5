//! # Identifier Codec
//!
//! Converts internal identifiers (UUIDv7) to the opaque base-62 strings that
//! clients see, and back.
//!
//! ## Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Internal ID → External ID                           │
//! │                                                                         │
//! │  0190a5f2-7c3e-7b4d-8e21-5f0a9c3d2b17    (UUIDv7, 16 bytes)            │
//! │       │                                                                 │
//! │       ▼  bytes read as one unsigned big-endian integer                 │
//! │  2080284552665538929383001165280389911   (u128)                        │
//! │       │                                                                 │
//! │       ▼  repeated division by 62, digits 0-9 a-z A-Z                   │
//! │  "2X5ZV3lFR5JOJs1v1yMVF"                 (≤ 22 chars)                  │
//! │                                                                         │
//! │  Decode runs the same steps in reverse and only accepts the exact      │
//! │  string Encode would have produced (no leading zeros, no padding).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::id::{decode, encode, new_id};
//!
//! let id = new_id();
//! let external = encode(id);
//! assert_eq!(decode(&external).unwrap(), id);
//! ```

use thiserror::Error;
use uuid::Uuid;

/// Digit alphabet, in digit-value order.
const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u128 = 62;

/// Longest possible encoding of a 128-bit value.
const MAX_ENCODED_LEN: usize = 22;

/// Reasons an external identifier cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input string was empty.
    #[error("identifier is empty")]
    Empty,

    /// The input contains a character outside `0-9a-zA-Z`.
    #[error("invalid character '{0}' in identifier")]
    InvalidCharacter(char),

    /// The decoded value does not fit in 128 bits.
    #[error("identifier is out of range")]
    Overflow,

    /// The input decodes, but is not the string `encode` produces for that value.
    #[error("identifier is not in canonical form")]
    NonCanonical,
}

/// Generates a fresh time-ordered identifier.
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// Encodes an internal identifier as a base-62 string.
///
/// Never fails. The nil UUID encodes to `"0"`.
pub fn encode(id: Uuid) -> String {
    let mut value = id.as_u128();
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(MAX_ENCODED_LEN);
    while value > 0 {
        digits.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base-62 string back into an internal identifier.
///
/// ## Returns
/// * `Ok(Uuid)` - The identifier `encode` was given
/// * `Err(DecodeError)` - Empty, garbage, too large, or non-canonical input
pub fn decode(external: &str) -> Result<Uuid, DecodeError> {
    if external.is_empty() {
        return Err(DecodeError::Empty);
    }
    if external.len() > 1 && external.starts_with('0') {
        return Err(DecodeError::NonCanonical);
    }

    let mut value: u128 = 0;
    for c in external.chars() {
        let digit = digit_value(c).ok_or(DecodeError::InvalidCharacter(c))?;
        value = value
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(DecodeError::Overflow)?;
    }

    Ok(Uuid::from_u128(value))
}

fn digit_value(c: char) -> Option<u128> {
    let d = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'a'..='z' => c as u32 - 'a' as u32 + 10,
        'A'..='Z' => c as u32 - 'A' as u32 + 36,
        _ => return None,
    };
    Some(d as u128)
}

// =============================================================================
// Unit Tests
// =============================================================================
