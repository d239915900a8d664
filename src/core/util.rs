// src/core/util.rs
//! Small utility functions used across the core module
//!
//! Keep this light. If it grows, split further.

/// Compare two byte strings without an early exit on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
