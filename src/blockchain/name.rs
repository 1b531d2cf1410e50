//! Account/action/permission name encoding.
//!
//! Names are up to 13 characters from `.12345a-z`, packed five bits per
//! character into a `u64`; the 13th character only gets four bits.

use crate::blockchain::types::{ChainError, ChainResult};

const MAX_NAME_LEN: usize = 13;

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ChainError {
    ChainError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Encode a name into its `u64` form.
pub fn encode_name(name: &str) -> ChainResult<u64> {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_NAME_LEN {
        return Err(invalid(name, format!("longer than {} characters", MAX_NAME_LEN)));
    }

    let mut value = 0u64;
    for (i, &c) in bytes.iter().enumerate() {
        let symbol = char_to_symbol(c)
            .ok_or_else(|| invalid(name, format!("invalid character {:?}", c as char)))?;
        if i < MAX_NAME_LEN - 1 {
            value |= (symbol & 0x1f) << (64 - 5 * (i + 1));
        } else {
            if symbol > 0x0f {
                return Err(invalid(name, "13th character must be in [.1-5a-j]"));
            }
            value |= symbol;
        }
    }
    Ok(value)
}

/// Whether `name` can be encoded.
pub fn is_valid_name(name: &str) -> bool {
    encode_name(name).is_ok()
}
