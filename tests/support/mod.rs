#![allow(dead_code)]

pub mod files;
pub mod requests;

/// Assert two floats agree within `tolerance`.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
