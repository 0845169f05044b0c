//! Linear curve calibration from price, quantity and elasticity.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ProductPriceMode;
use crate::constants::NON_ZERO;
use crate::domain::{CurveForm, DomainKind, Market};

/// Slope and intercept of one domain, aligned to the base index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub slope: Vec<f64>,
    pub intercept: Vec<f64>,
}

/// Curves of every optimized domain for one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub demand: Curve,
    pub export: Curve,
    pub import: Curve,
    pub manufacture: Curve,
    pub supply: Curve,
}

impl Calibration {
    pub fn curve(&self, kind: DomainKind) -> &Curve {
        match kind {
            DomainKind::Demand => &self.demand,
            DomainKind::Export => &self.export,
            DomainKind::Import => &self.import,
            DomainKind::Manufacture => &self.manufacture,
            DomainKind::Supply => &self.supply,
        }
    }

    fn curve_mut(&mut self, kind: DomainKind) -> &mut Curve {
        match kind {
            DomainKind::Demand => &mut self.demand,
            DomainKind::Export => &mut self.export,
            DomainKind::Import => &mut self.import,
            DomainKind::Manufacture => &mut self.manufacture,
            DomainKind::Supply => &mut self.supply,
        }
    }
}

/// Values carried forward from the preceding period
pub struct PreviousCalibration<'a> {
    pub calibration: &'a Calibration,
    pub market: &'a Market,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Calibrate one curve from price, quantity and elasticity
pub fn calibrate_curve(form: CurveForm, price: &[f64], quantity: &[f64], elasticity: &[f64]) -> Curve {
    let mut slope = Vec::with_capacity(price.len());
    let mut intercept = Vec::with_capacity(price.len());
    for i in 0..price.len() {
        let (p, q) = match form {
            CurveForm::Inverted => {
                let q = quantity[i].max(0.0);
                (price[i].max(0.0), if q == 0.0 { NON_ZERO } else { q })
            }
            CurveForm::Regular => (price[i], quantity[i]),
        };
        let s = match form {
            CurveForm::Inverted => finite_or_zero((1.0 / elasticity[i]) * p / q),
            CurveForm::Regular => finite_or_zero(elasticity[i] * p / q),
        };
        slope.push(s);
        intercept.push(finite_or_zero(p - s * q));
    }
    Curve { slope, intercept }
}

/// Calibrate every optimized domain for one period
pub fn calibrate(
    market: &Market,
    price_mode: ProductPriceMode,
    period: usize,
    previous: Option<PreviousCalibration<'_>>,
) -> Calibration {
    let mut calibration = Calibration::default();
    for kind in DomainKind::all() {
        let mut curve = calibrate_curve(
            kind.curve_form(),
            market.price(kind),
            market.quantity(kind),
            market.elasticity(kind),
        );

        if price_mode == ProductPriceMode::Calculated && period > 0 {
            if let Some(prev) = previous.as_ref() {
                carry_forward(&mut curve, prev.calibration.curve(kind), prev.market.price(kind));
            }
        }

        let violations = sign_violations(&curve);
        if violations.slope > 0 || violations.intercept > 0 {
            debug!(
                domain = %kind,
                slopes = violations.slope,
                intercepts = violations.intercept,
                "Curve sign convention violated"
            );
        }
        *calibration.curve_mut(kind) = curve;
    }
    calibration
}

/// Backfill zero slopes, and intercepts whose preceding price was zero
fn carry_forward(curve: &mut Curve, previous: &Curve, previous_price: &[f64]) {
    let mut filled = 0usize;
    for i in 0..curve.slope.len() {
        if curve.slope[i] == 0.0 && previous.slope.get(i).is_some_and(|s| *s != 0.0) {
            curve.slope[i] = previous.slope[i];
            filled += 1;
        }
        if previous_price.get(i).is_some_and(|p| *p == 0.0) {
            if let Some(prev) = previous.intercept.get(i) {
                curve.intercept[i] = *prev;
            }
        }
    }
    if filled > 0 {
        warn!(filled, "Carried forward zero slopes from preceding period");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignViolations {
    pub slope: usize,
    pub intercept: usize,
}

/// Count entries breaking slope >= 0, intercept <= 0
pub fn sign_violations(curve: &Curve) -> SignViolations {
    SignViolations {
        slope: curve.slope.iter().filter(|s| **s < 0.0).count(),
        intercept: curve.intercept.iter().filter(|i| **i > 0.0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CurveForm::Inverted, 100.0, 10.0, -0.5, -20.0)]
    #[case(CurveForm::Regular, 40.0, 10.0, 0.5, 2.0)]
    fn test_slope_formula(
        #[case] form: CurveForm,
        #[case] price: f64,
        #[case] quantity: f64,
        #[case] elasticity: f64,
        #[case] expected: f64,
    ) {
        let curve = calibrate_curve(form, &[price], &[quantity], &[elasticity]);
        assert!((curve.slope[0] - expected).abs() < 1e-12, "Got slope {}", curve.slope[0]);
        assert!((curve.intercept[0] - (price - expected * quantity)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elasticity_gives_flat_curve() {
        let curve = calibrate_curve(CurveForm::Inverted, &[80.0], &[5.0], &[0.0]);
        assert_eq!(curve.slope[0], 0.0, "Infinite slope must collapse to zero");
        assert_eq!(curve.intercept[0], 80.0);
    }

    #[test]
    fn test_zero_quantity_is_floored() {
        let curve = calibrate_curve(CurveForm::Inverted, &[0.0], &[0.0], &[-1.0]);
        assert_eq!(curve.slope[0], 0.0);
        assert_eq!(curve.intercept[0], 0.0);
        assert!(curve.slope.iter().chain(&curve.intercept).all(|v| v.is_finite()));
    }

    #[test]
    fn test_regular_zero_quantity_replaced_with_zero() {
        let curve = calibrate_curve(CurveForm::Regular, &[40.0], &[0.0], &[0.5]);
        assert_eq!(curve.slope[0], 0.0, "Division by zero is replaced with zero");
        assert_eq!(curve.intercept[0], 40.0);
    }

    #[test]
    fn test_carry_forward_fills_zero_slopes() {
        let previous = Curve { slope: vec![-3.0, -1.0], intercept: vec![50.0, 60.0] };
        let mut curve = Curve { slope: vec![0.0, -2.0], intercept: vec![10.0, 20.0] };
        carry_forward(&mut curve, &previous, &[0.0, 5.0]);
        assert_eq!(curve.slope, vec![-3.0, -2.0]);
        assert_eq!(curve.intercept, vec![50.0, 20.0], "Only cells with zero preceding price take the old intercept");
    }

    #[test]
    fn test_sign_violations_counted() {
        let curve = Curve { slope: vec![-1.0, 2.0], intercept: vec![3.0, -1.0] };
        assert_eq!(sign_violations(&curve), SignViolations { slope: 1, intercept: 1 });
    }
}
