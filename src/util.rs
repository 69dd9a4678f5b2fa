/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```should_panic
/// # use warehouse_mdp::assert_interval;
/// let value = 2.0;
/// assert_interval!(value, 0.0, 1.0);
/// ```
/// This will panic with the message "Invalid value for \`value\`. Must be in the interval \[0, 1\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Absolute tolerance used when checking that outcome probabilities sum to one
pub const PROB_TOLERANCE: f64 = 1e-9;

/// Returns `true` if `total` is within [`PROB_TOLERANCE`] of 1
pub fn is_unit_mass(total: f64) -> bool {
    (total - 1.0).abs() <= PROB_TOLERANCE
}
