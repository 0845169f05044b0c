//! Product price determination from the solved period.

use tracing::info;

use crate::alignment::{BaseIndex, CommodityGroups};
use crate::constants::{NON_ZERO, PRICE_DEVIATION_THRESHOLD};
use crate::optimizer::MaterialBalanceHandle;

/// Isoelastic interpolation along the calibrated curve:
/// `previous_price * (quantity / previous_quantity)^elasticity`
///
/// A previous quantity at or below [`NON_ZERO`] is the floor written back for
/// an empty cell and counts as zero, so the interpolation degenerates to zero.
pub fn calculated_price(previous_price: &[f64], quantity: &[f64], previous_quantity: &[f64], elasticity: &[f64]) -> Vec<f64> {
    previous_price
        .iter()
        .zip(quantity)
        .zip(previous_quantity)
        .zip(elasticity)
        .map(|(((&p, &q), &q0), &e)| {
            let base = if q0 <= NON_ZERO { 0.0 } else { q0 };
            let value = p * (q / base).powf(e);
            if value.is_finite() {
                value
            } else {
                0.0
            }
        })
        .collect()
}

/// Solver quantity clipped into `[lower, upper]` and floored at [`NON_ZERO`]
pub fn clip_to_bounds(quantity: &[f64], lower: &[f64], upper: &[f64]) -> Vec<f64> {
    quantity
        .iter()
        .zip(lower)
        .zip(upper)
        .map(|((&q, &lb), &ub)| q.max(lb).min(ub).max(NON_ZERO))
        .collect()
}

/// Cap prices at a per-cell ceiling, leaving cells where `exempt` holds untouched
pub fn cap_prices(prices: &[f64], ceiling: &[f64], exempt: impl Fn(usize) -> bool) -> Vec<f64> {
    prices
        .iter()
        .zip(ceiling)
        .enumerate()
        .map(|(cell, (&p, &cap))| if exempt(cell) { p } else { p.min(cap) })
        .collect()
}

/// Absolute material balance dual of every cell.
///
/// Rest of World cells, cells without a balance row and cells whose current
/// price is not positive get zero.
pub fn shadow_prices(
    index: &BaseIndex,
    groups: &CommodityGroups,
    handle: &MaterialBalanceHandle,
    z: &[f64],
    current_price: &[f64],
) -> Vec<f64> {
    (0..index.len())
        .map(|cell| {
            if current_price[cell] <= 0.0 {
                return 0.0;
            }
            handle
                .cell_row(index, groups, cell)
                .and_then(|row| z.get(row))
                .map(|d| d.abs())
                .unwrap_or(0.0)
        })
        .collect()
}

/// Replace shadow prices that jump too far from the preceding price by the calculated price
pub fn correct_shadow_prices(shadow: &mut [f64], previous_price: &[f64], calculated: &[f64], domain: &str) -> usize {
    let mut corrected = 0usize;
    for i in 0..shadow.len() {
        let ratio = previous_price[i] / shadow[i];
        let deviation = if ratio.is_nan() { 0.0 } else { ratio };
        let too_low = deviation <= 1.0 - PRICE_DEVIATION_THRESHOLD && deviation != 0.0;
        let too_high = deviation >= 1.0 + PRICE_DEVIATION_THRESHOLD;
        if too_low || too_high {
            shadow[i] = calculated[i];
            corrected += 1;
        }
    }
    if corrected > 0 {
        info!(domain, corrected, "Shadow prices replaced by calculated prices");
    }
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculated_price_is_isoelastic() {
        let price = calculated_price(&[100.0], &[20.0], &[10.0], &[-0.5]);
        assert!((price[0] - 100.0 / 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_calculated_price_degenerate_is_zero() {
        let price = calculated_price(&[100.0], &[20.0], &[0.0], &[1.0]);
        assert_eq!(price[0], 0.0, "Infinite interpolation collapses to zero");
    }

    #[test]
    fn test_floored_previous_quantity_prices_to_zero() {
        let price = calculated_price(&[50.0, 50.0], &[10.0, 10.0], &[NON_ZERO, NON_ZERO], &[0.5, -0.5]);
        assert_eq!(price, vec![0.0, 0.0], "An empty cell has no curve to interpolate along");

        let price = calculated_price(&[50.0], &[10.0], &[1e-6], &[0.5]);
        assert!(price[0] > 0.0, "Small but real quantities still interpolate");
    }

    #[test]
    fn test_clip_to_bounds_pulls_solver_noise_inside() {
        let clipped = clip_to_bounds(&[80.0 + 1e-6, 5.0 - 1e-7, 7.0, -1e-9], &[0.0, 5.0, 0.0, 0.0], &[80.0, 10.0, 10.0, 10.0]);
        assert_eq!(clipped, vec![80.0, 5.0, 7.0, NON_ZERO]);
    }

    #[test]
    fn test_calculated_price_from_quantity_outside_bounds() {
        // solver overshoots the upper bound of a cell pinned at its base quantity
        let raw = [80.0 + 1e-3];
        let cleaned = clip_to_bounds(&raw, &[0.0], &[80.0]);
        let from_cleaned = calculated_price(&[40.0], &cleaned, &[80.0], &[0.8]);
        let from_raw = calculated_price(&[40.0], &raw, &[80.0], &[0.8]);
        assert_eq!(from_cleaned, vec![40.0], "A pinned cell keeps its price");
        assert!(from_raw[0] > 40.0);
    }

    #[test]
    fn test_cap_prices_skips_exempt_cells() {
        let capped = cap_prices(&[50.0, 50.0, 30.0], &[45.0, 45.0, 45.0], |cell| cell == 1);
        assert_eq!(capped, vec![45.0, 50.0, 30.0]);
    }

    #[test]
    fn test_shadow_price_correction_band() {
        let mut shadow = vec![100.0, 300.0, 40.0, 0.0, 5.0];
        let previous = vec![110.0, 100.0, 100.0, 0.0, 0.0];
        let calculated = vec![1.0, 2.0, 3.0, 4.0, 5.5];
        let corrected = correct_shadow_prices(&mut shadow, &previous, &calculated, "Demand");
        // 110/100 stays, 100/300 too low, 100/40 too high, 0/0 undefined stays, 0/5 is zero and stays
        assert_eq!(shadow, vec![100.0, 2.0, 3.0, 0.0, 5.0]);
        assert_eq!(corrected, 2);
    }

    #[test]
    fn test_vanished_shadow_price_falls_back() {
        let mut shadow = vec![0.0];
        correct_shadow_prices(&mut shadow, &[50.0], &[48.0], "Supply");
        assert_eq!(shadow[0], 48.0, "Infinite deviation must fall back to the calculated price");
    }
}
