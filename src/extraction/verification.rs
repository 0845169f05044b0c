//! Post-solve balance checks. Diagnostic only, never fatal.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bounds::Bounds;
use crate::constants::VERIFICATION_THRESHOLD;
use crate::domain::{CommodityGroup, DomainKind};
use crate::optimizer::{cell_residual, BalanceContext};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Largest |Σ exports − Σ imports| over commodities, Rest of World included
    pub trade_balance_max: f64,
    pub trade_balance_violations: usize,
    pub material_balance_max: f64,
    pub material_balance_violations: usize,
    /// Residual of all balance laws summed over real regions and Rest of World trade
    pub global_balance_residual: f64,
    pub supply_upper_violations: usize,
    pub trade_bound_violations: usize,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.trade_balance_violations == 0
            && self.material_balance_violations == 0
            && self.global_balance_residual.abs() <= VERIFICATION_THRESHOLD
            && self.supply_upper_violations == 0
            && self.trade_bound_violations == 0
    }
}

fn max_abs(values: impl Iterator<Item = f64>) -> f64 {
    values.map(|v| OrderedFloat(v.abs())).max().map(|v| v.0).unwrap_or(0.0)
}

/// Check a solved vector `x` against trade, material balance and bound laws
pub fn verify(ctx: &BalanceContext<'_>, bounds: &Bounds, x: &[f64], period: usize) -> VerificationReport {
    let index = ctx.index;
    let layout = ctx.layout;
    let mut report = VerificationReport::default();

    let trade_residuals: Vec<f64> = (0..index.commodity_count())
        .map(|c| {
            (0..index.region_count())
                .map(|r| {
                    let cell = index.cell(r, c);
                    x[layout.var(DomainKind::Export, cell)] - x[layout.var(DomainKind::Import, cell)]
                })
                .sum()
        })
        .collect();
    report.trade_balance_max = max_abs(trade_residuals.iter().copied());
    report.trade_balance_violations = trade_residuals.iter().filter(|r| r.abs() > VERIFICATION_THRESHOLD).count();

    let balance_residuals: Vec<f64> = index
        .real_cells()
        .filter_map(|cell| {
            let group = ctx.groups.group_of(index.commodity_of(cell))?;
            Some(cell_residual(ctx, cell, group, x))
        })
        .collect();
    report.material_balance_max = max_abs(balance_residuals.iter().copied());
    report.material_balance_violations = balance_residuals.iter().filter(|r| r.abs() > VERIFICATION_THRESHOLD).count();

    let row = index.rest_of_world();
    let row_trade: f64 = (0..index.commodity_count())
        .filter(|&c| {
            ctx.groups
                .group_of(c)
                .is_some_and(|g| g != CommodityGroup::OtherRoundwood)
        })
        .map(|c| {
            let cell = index.cell(row, c);
            x[layout.var(DomainKind::Import, cell)] - x[layout.var(DomainKind::Export, cell)]
        })
        .sum();
    report.global_balance_residual = balance_residuals.iter().sum::<f64>() + row_trade;

    let supply_upper = bounds.upper(DomainKind::Supply);
    report.supply_upper_violations = (0..index.len())
        .filter(|&cell| x[layout.var(DomainKind::Supply, cell)] - supply_upper[cell] > VERIFICATION_THRESHOLD)
        .count();

    report.trade_bound_violations = [DomainKind::Export, DomainKind::Import]
        .iter()
        .map(|&kind| {
            let lower = bounds.lower(kind);
            let upper = bounds.upper(kind);
            (0..index.len())
                .filter(|&cell| {
                    let q = x[layout.var(kind, cell)];
                    q - upper[cell] > VERIFICATION_THRESHOLD || lower[cell] - q > VERIFICATION_THRESHOLD
                })
                .count()
        })
        .sum();

    if report.is_clean() {
        info!(period, "Verification passed");
    } else {
        warn!(
            period,
            trade_balance_violations = report.trade_balance_violations,
            material_balance_violations = report.material_balance_violations,
            global_balance_residual = report.global_balance_residual,
            supply_upper_violations = report.supply_upper_violations,
            trade_bound_violations = report.trade_bound_violations,
            "Verification mismatches"
        );
    }
    report
}
