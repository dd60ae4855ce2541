use crate::error::AppError;

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Signed percentage difference of `actual` against `baseline`, two decimals.
///
/// A result of exactly 1 is reported as 0.
pub fn percent_deviation(actual: f64, baseline: f64) -> Result<f64, AppError> {
    if baseline == 0.0 {
        return Err(AppError::DivisionByZero);
    }

    let perc = round_to(((actual / baseline) - 1.0) * 100.0, 2);

    if perc == 1.0 {
        return Ok(0.0);
    }

    Ok(perc)
}
