//! Constant-time comparison shared by webhook verification and the
//! bearer-token checks in the service. Uses the `subtle` crate for
//! timing-attack resistance.

use subtle::ConstantTimeEq;

/// Compare two byte strings without leaking where they differ.
///
/// Inputs of different length are rejected up front: the length of a
/// `sha256=<hex>` header is public, so the short-circuit leaks nothing, and
/// the content comparison only ever runs on equal-length buffers.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_match() {
        assert!(constant_time_eq(b"hello", b"hello"));
    }

    #[test]
    fn different_inputs_do_not_match() {
        assert!(!constant_time_eq(b"hello", b"world"));
    }

    #[test]
    fn different_length_inputs_do_not_match() {
        assert!(!constant_time_eq(b"short", b"much longer string"));
        assert!(!constant_time_eq(b"hello", b"hello "));
    }

    #[test]
    fn empty_inputs_match() {
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn empty_vs_nonempty_do_not_match() {
        assert!(!constant_time_eq(b"", b"notempty"));
    }
}
