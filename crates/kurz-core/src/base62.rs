//! Base62 encoding of allocator identifiers into short codes.
//!
//! Identifiers are shifted by [`ID_OFFSET`] before encoding so that even the
//! first identifier produces a six character code. Digits are written most
//! significant first over [`ALPHABET`].

use crate::error::{CoreError, Result};
use crate::shortcode::ShortCode;

/// The 62 symbols used for encoding, in digit order.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Added to every identifier before encoding.
pub const ID_OFFSET: u64 = 1_000_000_000;

/// Largest identifier that can be encoded without overflowing `u64`.
pub const MAX_ID: u64 = u64::MAX - ID_OFFSET;

const BASE: u64 = ALPHABET.len() as u64;

// u64::MAX needs 11 base62 digits.
const MAX_DIGITS: usize = 11;

/// Encodes an identifier into a short code.
///
/// # Panics
///
/// Panics if `id` is greater than [`MAX_ID`]. Allocators never hand out such
/// identifiers, so reaching this is a bug in the caller.
pub fn encode(id: u64) -> ShortCode {
    let mut value = id
        .checked_add(ID_OFFSET)
        .unwrap_or_else(|| panic!("identifier {id} exceeds the encodable range (max {MAX_ID})"));

    let mut digits = [0u8; MAX_DIGITS];
    let mut start = MAX_DIGITS;
    while value > 0 {
        start -= 1;
        digits[start] = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }

    // Only ASCII alphanumerics are ever written into `digits`.
    let code: String = digits[start..].iter().map(|&b| b as char).collect();
    ShortCode::new_unchecked(code)
}

/// Decodes a short code back into the identifier it was encoded from.
pub fn decode(code: &str) -> Result<u64> {
    if code.is_empty() {
        return Err(CoreError::InvalidShortCode("empty code".to_string()));
    }

    let mut value: u64 = 0;
    for c in code.bytes() {
        let digit = digit_of(c).ok_or_else(|| {
            CoreError::InvalidShortCode(format!("'{}' is not a base62 symbol", c as char))
        })?;
        value = value
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| CoreError::InvalidShortCode(format!("'{code}' overflows u64")))?;
    }

    value.checked_sub(ID_OFFSET).ok_or_else(|| {
        CoreError::InvalidShortCode(format!("'{code}' is below the identifier offset"))
    })
}

fn digit_of(c: u8) -> Option<u64> {
    let digit = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        _ => return None,
    };
    Some(digit as u64)
}
