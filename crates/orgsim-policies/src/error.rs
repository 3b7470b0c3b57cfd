//! Error types for the orgsim-policies crate.
//!
//! Policies never fail mid-run; every check happens when a policy is built
//! from its parameters.

/// Errors raised while constructing a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A fraction or probability fell outside `[0, 1]`.
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// A parameter that must be non-negative was negative or NaN.
    #[error("{name} must be non-negative, got {value}")]
    Negative {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Check that `value` lies in `[0, 1]`.
///
/// # Errors
///
/// Returns [`PolicyError::OutOfUnitRange`] otherwise.
pub fn check_unit(name: &'static str, value: f64) -> Result<f64, PolicyError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PolicyError::OutOfUnitRange { name, value })
    }
}

/// Check that `value` is finite and non-negative.
///
/// # Errors
///
/// Returns [`PolicyError::Negative`] otherwise.
pub fn check_non_negative(name: &'static str, value: f64) -> Result<f64, PolicyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PolicyError::Negative { name, value })
    }
}
