//! Shared test utilities for the tile-mosaic workspace.
//!
//! This crate provides common testing infrastructure including:
//! - In-memory reader providers
//! - Scripted overview levels with injected lookup failures
//! - Temporary tile directories
//! - Sample buffer generators
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your integration tests:
//!
//! ```ignore
//! use test_utils::{MemoryProvider, ScriptedLevel};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate equality of world coordinate pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_world_eq;
///
/// assert_world_eq!(transform.apply(2.0, -2.0), (7.0, -4.0), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_world_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let (ax, ay): (f64, f64) = $actual;
        let (ex, ey): (f64, f64) = $expected;
        let epsilon: f64 = $epsilon;
        if (ax - ex).abs() > epsilon || (ay - ey).abs() > epsilon {
            panic!(
                "assertion failed: `(actual ≈ expected)`\n  actual: `({:?}, {:?})`,\nexpected: `({:?}, {:?})`, epsilon `{:?}`",
                ax, ay, ex, ey, epsilon
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_world_eq_passes() {
        assert_world_eq!((1.0000001, -2.0), (1.0, -2.0), 1e-6);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_world_eq_fails() {
        assert_world_eq!((1.1, 0.0), (1.0, 0.0), 1e-3);
    }
}
