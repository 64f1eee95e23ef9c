//! Level conversions and numeric guards shared by the compressor stages

/// Convert decibels to a linear amplitude ratio
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(0.05 * db)
}

/// Convert a linear amplitude ratio to decibels
///
/// Zero maps to negative infinity; callers that can see zero must guard the
/// result with [`fix_gremlins`] or floor the input first.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.log10()
}

/// One-pole smoothing coefficient for a time constant at a given rate
///
/// `coeff = 1 - exp(-1 / (rate * time_constant))`
pub fn discrete_time_constant(time_constant: f64, rate: f64) -> f64 {
    1.0 - (-1.0 / (rate * time_constant)).exp()
}

/// Replace NaN or infinity with a safe fallback
#[inline]
pub fn fix_gremlins(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
