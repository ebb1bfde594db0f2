//! Indicator implementations.
//!
//! Indicators are pure functions over a close series ordered by date: closes
//! in, an index-aligned series out, NaN wherever no value exists yet.

pub mod rsi;

pub use rsi::{nullable, Rsi};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}
