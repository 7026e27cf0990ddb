//! Fractional index keys for sibling ordering.
//!
//! A key is a string that sorts lexicographically (byte order) among its
//! siblings. New keys can always be generated strictly between two existing
//! keys, or before the first / after the last one, so inserting or moving a
//! node never renumbers its siblings.
//!
//! # Key Format
//!
//! Keys use the base-62 alphabet `0-9A-Za-z`, which is already in ASCII order.
//! Every key has two parts:
//!
//! - **Integer part**: a head character encoding the length, followed by
//!   digits. `a0`..`az` have one digit, `b00`..`bzz` two, and so on. Heads
//!   `A`..`Z` mirror this for keys that sort before `a0`.
//! - **Fraction**: optional digits that never end in `0`.
//!
//! Appending at either boundary only increments or decrements the integer
//! part, so repeated appends grow keys logarithmically rather than linearly.
//!
//! # Example
//!
//! ```rust
//! use swatch_tree::key_between;
//!
//! let first = key_between(None, None).unwrap();
//! let last = key_between(Some(first.as_str()), None).unwrap();
//! let middle = key_between(Some(first.as_str()), Some(last.as_str())).unwrap();
//!
//! assert!(first < middle && middle < last);
//! ```

use thiserror::Error;

/// The base-62 alphabet, in byte order.
pub const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: usize = 62;
const ZERO: u8 = b'0';
const LAST: u8 = b'z';

/// The smallest representable integer part; it has no predecessor.
const SMALLEST_INTEGER: &[u8] = b"A00000000000000000000000000";

/// Errors from generating or validating order keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The key is not a well-formed fractional index.
    #[error("invalid order key '{0}'")]
    InvalidKey(String),
    /// The lower bound does not sort before the upper bound.
    #[error("order key '{lower}' must sort before '{upper}'")]
    OutOfOrder { lower: String, upper: String },
    /// No key exists past the requested boundary.
    #[error("order key space exhausted")]
    Exhausted,
}

/// Generates a key that sorts strictly between `lower` and `upper`.
///
/// `None` stands for an open boundary: `key_between(None, None)` yields the
/// first key of an empty sibling list, `key_between(Some(last), None)` appends
/// and `key_between(None, Some(first))` prepends.
pub fn key_between(lower: Option<&str>, upper: Option<&str>) -> Result<String, IndexError> {
    if let Some(a) = lower {
        validate_key(a)?;
    }
    if let Some(b) = upper {
        validate_key(b)?;
    }
    if let (Some(a), Some(b)) = (lower, upper) {
        if a >= b {
            return Err(IndexError::OutOfOrder {
                lower: a.to_string(),
                upper: b.to_string(),
            });
        }
    }

    let bytes = match (lower, upper) {
        (None, None) => vec![b'a', ZERO],
        (None, Some(b)) => {
            let b = b.as_bytes();
            let int_b = integer_part(b)?;
            let frac_b = &b[int_b.len()..];
            if int_b == SMALLEST_INTEGER {
                let mut out = int_b.to_vec();
                out.extend(midpoint(b"", Some(frac_b))?);
                out
            } else if int_b.len() < b.len() {
                int_b.to_vec()
            } else {
                decrement_integer(int_b)?.ok_or(IndexError::Exhausted)?
            }
        }
        (Some(a), None) => {
            let a = a.as_bytes();
            let int_a = integer_part(a)?;
            let frac_a = &a[int_a.len()..];
            match increment_integer(int_a)? {
                Some(next) => next,
                None => {
                    let mut out = int_a.to_vec();
                    out.extend(midpoint(frac_a, None)?);
                    out
                }
            }
        }
        (Some(a), Some(b)) => {
            let (a, b) = (a.as_bytes(), b.as_bytes());
            let int_a = integer_part(a)?;
            let frac_a = &a[int_a.len()..];
            let int_b = integer_part(b)?;
            let frac_b = &b[int_b.len()..];
            if int_a == int_b {
                let mut out = int_a.to_vec();
                out.extend(midpoint(frac_a, Some(frac_b))?);
                out
            } else {
                let next = increment_integer(int_a)?.ok_or(IndexError::Exhausted)?;
                if next.as_slice() < b {
                    next
                } else {
                    let mut out = int_a.to_vec();
                    out.extend(midpoint(frac_a, None)?);
                    out
                }
            }
        }
    };

    // Only alphabet bytes are ever produced.
    String::from_utf8(bytes).map_err(|e| IndexError::InvalidKey(e.to_string()))
}

/// Generates `n` ascending keys, all strictly between `lower` and `upper`.
///
/// The keys are spread out so that later insertions between any two of them
/// stay short.
pub fn keys_between(
    lower: Option<&str>,
    upper: Option<&str>,
    n: usize,
) -> Result<Vec<String>, IndexError> {
    match n {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![key_between(lower, upper)?]),
        _ => {}
    }

    if upper.is_none() {
        let mut keys = Vec::with_capacity(n);
        let mut current = key_between(lower, upper)?;
        for _ in 1..n {
            let next = key_between(Some(current.as_str()), upper)?;
            keys.push(std::mem::replace(&mut current, next));
        }
        keys.push(current);
        return Ok(keys);
    }

    if lower.is_none() {
        let mut keys = Vec::with_capacity(n);
        let mut current = key_between(lower, upper)?;
        for _ in 1..n {
            let prev = key_between(lower, Some(current.as_str()))?;
            keys.push(std::mem::replace(&mut current, prev));
        }
        keys.push(current);
        keys.reverse();
        return Ok(keys);
    }

    let mid = n / 2;
    let pivot = key_between(lower, upper)?;
    let mut keys = keys_between(lower, Some(pivot.as_str()), mid)?;
    let tail = keys_between(Some(pivot.as_str()), upper, n - mid - 1)?;
    keys.push(pivot);
    keys.extend(tail);
    Ok(keys)
}

/// Checks that `key` is a well-formed order key.
pub fn validate_key(key: &str) -> Result<(), IndexError> {
    let bytes = key.as_bytes();
    if bytes == SMALLEST_INTEGER {
        return Err(IndexError::InvalidKey(key.to_string()));
    }
    let int = integer_part(bytes)?;
    for &c in bytes {
        digit_value(c)?;
    }
    if bytes.len() > int.len() && bytes.last() == Some(&ZERO) {
        return Err(IndexError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn invalid(bytes: &[u8]) -> IndexError {
    IndexError::InvalidKey(String::from_utf8_lossy(bytes).into_owned())
}

fn digit_value(c: u8) -> Result<usize, IndexError> {
    match c {
        b'0'..=b'9' => Ok((c - b'0') as usize),
        b'A'..=b'Z' => Ok((c - b'A') as usize + 10),
        b'a'..=b'z' => Ok((c - b'a') as usize + 36),
        _ => Err(invalid(&[c])),
    }
}

fn integer_length(head: u8) -> Result<usize, IndexError> {
    match head {
        b'a'..=b'z' => Ok((head - b'a') as usize + 2),
        b'A'..=b'Z' => Ok((b'Z' - head) as usize + 2),
        _ => Err(invalid(&[head])),
    }
}

fn integer_part(key: &[u8]) -> Result<&[u8], IndexError> {
    let head = *key.first().ok_or_else(|| invalid(key))?;
    let len = integer_length(head)?;
    if len > key.len() {
        return Err(invalid(key));
    }
    Ok(&key[..len])
}

/// Returns a fraction strictly between `a` and `b` (`None` = open upper bound).
fn midpoint(a: &[u8], b: Option<&[u8]>) -> Result<Vec<u8>, IndexError> {
    if let Some(b) = b {
        if a >= b {
            return Err(IndexError::OutOfOrder {
                lower: String::from_utf8_lossy(a).into_owned(),
                upper: String::from_utf8_lossy(b).into_owned(),
            });
        }
        if b.last() == Some(&ZERO) {
            return Err(invalid(b));
        }
    }
    if a.last() == Some(&ZERO) {
        return Err(invalid(a));
    }

    if let Some(b) = b {
        // Shared prefix, treating a missing digit in `a` as zero.
        let mut n = 0;
        while n < b.len() && a.get(n).copied().unwrap_or(ZERO) == b[n] {
            n += 1;
        }
        if n > 0 {
            let mut out = b[..n].to_vec();
            out.extend(midpoint(a.get(n..).unwrap_or(&[]), Some(&b[n..]))?);
            return Ok(out);
        }
    }

    let digit_a = match a.first() {
        Some(&c) => digit_value(c)?,
        None => 0,
    };
    let digit_b = match b {
        Some(b) => digit_value(b[0])?,
        None => BASE,
    };

    if digit_b - digit_a > 1 {
        return Ok(vec![DIGITS[(digit_a + digit_b + 1) / 2]]);
    }
    if let Some(b) = b {
        if b.len() > 1 {
            return Ok(vec![b[0]]);
        }
    }
    let mut out = vec![DIGITS[digit_a]];
    out.extend(midpoint(a.get(1..).unwrap_or(&[]), None)?);
    Ok(out)
}

fn increment_integer(int: &[u8]) -> Result<Option<Vec<u8>>, IndexError> {
    let head = int[0];
    let mut digits = int[1..].to_vec();
    let mut carry = true;
    for slot in digits.iter_mut().rev() {
        let d = digit_value(*slot)? + 1;
        if d == BASE {
            *slot = ZERO;
        } else {
            *slot = DIGITS[d];
            carry = false;
            break;
        }
    }
    if !carry {
        let mut out = vec![head];
        out.extend(digits);
        return Ok(Some(out));
    }

    match head {
        b'Z' => Ok(Some(vec![b'a', ZERO])),
        b'z' => Ok(None),
        _ => {
            let next = head + 1;
            if next > b'a' {
                digits.push(ZERO);
            } else {
                digits.pop();
            }
            let mut out = vec![next];
            out.extend(digits);
            Ok(Some(out))
        }
    }
}

fn decrement_integer(int: &[u8]) -> Result<Option<Vec<u8>>, IndexError> {
    let head = int[0];
    let mut digits = int[1..].to_vec();
    let mut borrow = true;
    for slot in digits.iter_mut().rev() {
        let d = digit_value(*slot)?;
        if d == 0 {
            *slot = LAST;
        } else {
            *slot = DIGITS[d - 1];
            borrow = false;
            break;
        }
    }
    if !borrow {
        let mut out = vec![head];
        out.extend(digits);
        return Ok(Some(out));
    }

    match head {
        b'a' => Ok(Some(vec![b'Z', LAST])),
        b'A' => Ok(None),
        _ => {
            let prev = head - 1;
            if prev < b'Z' {
                digits.push(LAST);
            } else {
                digits.pop();
            }
            let mut out = vec![prev];
            out.extend(digits);
            Ok(Some(out))
        }
    }
}
