//! Numeric constants of the equilibrium model.

/// Floor for quantities that must stay strictly positive
pub const NON_ZERO: f64 = 1e-10;

/// Slack added to the trade inertia band of real regions
pub const TRADE_INERTIA_DEVIATION: f64 = 0.005;
/// Slack added to the trade inertia band of Rest of World
pub const TRADE_INERTIA_DEVIATION_ROW: f64 = 0.001;

/// Supply upper bound standing in for "no bound"
pub const BOUND_OMITTED: f64 = 99_999_999.0;
pub const DEMAND_HEADROOM: f64 = 1.25;
pub const MANUFACTURE_SLACK: f64 = 10_000.0;

/// Forest stock at or below which a region may stop exporting
pub const MIN_FOREST_STOCK: f64 = 1.0;
pub const FOREST_FLOOR: f64 = 0.001;
/// Forest quantities are kept in thousands of units
pub const UNIT_FACTOR: f64 = 1000.0;
pub const FOREST_EPSILON: f64 = 1e-10;

/// Relative shadow price change tolerated before falling back to the calculated price
pub const PRICE_DEVIATION_THRESHOLD: f64 = 0.5;

/// Corrected slopes at or above this value are reported as curvature violations
pub const CURVATURE_DETECT: f64 = 1e-3;

/// Residual above which a verification pass reports a mismatch
pub const VERIFICATION_THRESHOLD: f64 = 1.0;
