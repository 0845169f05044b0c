//! Update, growth and change primitives over one exogenous period block.

/// Change entry meaning "keep the current value"
pub const KEEP: f64 = 0.0;
/// Change entry meaning "keep the current value or switch to an alternate driver"
pub const KEEP_OR_SWITCH: f64 = -1.0;

/// Replace current values by the change entries, except where the entry is the sentinel
pub fn update(current: &[f64], change: &[f64], sentinel: f64) -> Vec<f64> {
    current
        .iter()
        .zip(change)
        .map(|(&cur, &chg)| if chg == sentinel { cur } else { chg })
        .collect()
}

/// Periodic growth rate `(1 + r)^length - 1` of yearly rates `r`.
///
/// With a sentinel, entries equal to it take the current value instead, or the
/// `switch` series when one is given.
pub fn growth(
    current: &[f64],
    change: &[f64],
    sentinel: Option<f64>,
    switch: Option<&[f64]>,
    length: u32,
) -> Vec<f64> {
    change
        .iter()
        .enumerate()
        .map(|(i, &rate)| {
            let rate = match sentinel {
                Some(s) if rate == s => switch
                    .and_then(|alt| alt.get(i).copied())
                    .unwrap_or_else(|| current.get(i).copied().unwrap_or(0.0)),
                _ => rate,
            };
            (1.0 + rate).powi(length as i32) - 1.0
        })
        .collect()
}

/// Additive change over the period: `rate * length`
pub fn change(rates: &[f64], length: u32) -> Vec<f64> {
    rates.iter().map(|&r| r * length as f64).collect()
}
