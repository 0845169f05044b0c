//! Objective and constraint blocks of the period equilibrium model.

use tracing::{debug, warn};

use super::{ModelInput, QpBuilder, RestOfWorldHandle, RowRange, TradeDeviation, TradeHandle, VariableLayout};
use crate::constants::{CURVATURE_DETECT, NON_ZERO, UNIT_FACTOR};
use crate::domain::{CommodityGroup, DomainKind};
use crate::optimizer::strategies::BalanceContext;

/// Curvature-corrected slopes and intercepts in vector order
pub struct ObjectiveTerms {
    pub slope: Vec<f64>,
    pub intercept: Vec<f64>,
    pub flipped: usize,
}

/// Apply curvature signs and repair slopes that would break concavity
pub fn objective_terms(input: &ModelInput<'_>, layout: &VariableLayout) -> ObjectiveTerms {
    let mut slope = Vec::with_capacity(layout.quantity_vars());
    let mut intercept = Vec::with_capacity(layout.quantity_vars());
    for kind in DomainKind::all() {
        let curve = input.calibration.curve(kind);
        let sign = kind.curvature();
        slope.extend(curve.slope.iter().map(|s| s * sign));
        intercept.extend(curve.intercept.iter().map(|i| i * sign));
    }

    let violating = slope.iter().filter(|s| **s >= CURVATURE_DETECT).count();
    let mut flipped = 0usize;
    for s in slope.iter_mut().filter(|s| **s > 0.0) {
        *s = -*s;
        flipped += 1;
    }
    if violating > 0 {
        warn!(period = input.period.period, violating, flipped, "Curvature violation, slopes sign flipped");
    }
    let positive_intercepts = intercept.iter().filter(|i| **i >= CURVATURE_DETECT).count();
    debug!(period = input.period.period, positive_intercepts, "Intercept orientation check");

    ObjectiveTerms { slope, intercept, flipped }
}

/// Maximize Σ intercept·q + ½ slope·q², posed as minimization
pub fn add_objective(qp: &mut QpBuilder, terms: &ObjectiveTerms) {
    for (var, (s, i)) in terms.slope.iter().zip(&terms.intercept).enumerate() {
        qp.add_objective(var, -s, -i);
    }
}

/// Trade bounds; follow periods add deviation variables for the soft penalty
pub fn trade_bounds(input: &ModelInput<'_>, layout: &mut VariableLayout, qp: &mut QpBuilder) -> TradeHandle {
    let index = &input.world.index;
    let bounds = input.bounds;
    let base = input.period.period == 0;
    let traded = [
        (DomainKind::Export, &input.market.export.quantity),
        (DomainKind::Import, &input.market.import.quantity),
    ];

    let hard = qp.block(|qp| {
        for (kind, previous) in traded {
            let lower = bounds.lower(kind);
            let upper = bounds.upper(kind);
            for cell in 0..index.len() {
                let dead_lane = previous[cell] <= NON_ZERO && !index.is_rest_of_world_cell(cell);
                if base || dead_lane {
                    let var = layout.var(kind, cell);
                    qp.push_leq(&[(var, 1.0)], upper[cell]);
                    qp.push_geq(&[(var, 1.0)], lower[cell]);
                }
            }
        }
    });

    if base {
        return TradeHandle { hard, deviation: RowRange { start: qp.rows(), len: 0 } };
    }

    let lanes: Vec<(DomainKind, usize)> = traded
        .iter()
        .flat_map(|(kind, _)| index.real_cells().map(move |cell| (*kind, cell)))
        .collect();
    let columns = qp.add_variables(2 * lanes.len());
    let mut column = columns.start;
    let deviation = qp.block(|qp| {
        for &(kind, cell) in &lanes {
            let q = layout.var(kind, cell);
            let (upper_dev, lower_dev) = (column, column + 1);
            column += 2;
            let ub = bounds.upper(kind)[cell];
            let lb = bounds.lower(kind)[cell];
            // d ≥ |q - bound| as two inequalities per side
            qp.push_geq(&[(upper_dev, 1.0), (q, -1.0)], -ub);
            qp.push_geq(&[(upper_dev, 1.0), (q, 1.0)], ub);
            qp.push_geq(&[(lower_dev, 1.0), (q, -1.0)], -lb);
            qp.push_geq(&[(lower_dev, 1.0), (q, 1.0)], lb);

            let weight = input.previous_world_price[index.commodity_of(cell)];
            qp.add_objective(upper_dev, 0.0, weight);
            qp.add_objective(lower_dev, 0.0, weight);
            layout.deviations.push(TradeDeviation { quantity: q, upper: upper_dev, lower: lower_dev });
        }
    });
    TradeHandle { hard, deviation }
}

/// q ≤ upper for every cell of one domain
pub fn upper_bound(input: &ModelInput<'_>, layout: &VariableLayout, kind: DomainKind, qp: &mut QpBuilder) -> RowRange {
    let upper = input.bounds.upper(kind);
    qp.block(|qp| {
        for (cell, ub) in upper.iter().enumerate() {
            qp.push_leq(&[(layout.var(kind, cell), 1.0)], *ub);
        }
    })
}

/// Harvest drawn from forest stock may not exceed the stock, per real region.
///
/// A region with zero inventory drain harvests without drawing on stock, so
/// its row is empty and its supply is not limited by the stock.
pub fn max_harvest(input: &ModelInput<'_>, layout: &VariableLayout, qp: &mut QpBuilder) -> RowRange {
    let index = &input.world.index;
    let forest = &input.market.forest;
    qp.block(|qp| {
        for region in 0..index.real_region_count() {
            let drain = forest.inventory_drain[region];
            let coeffs: Vec<(usize, f64)> = (0..index.commodity_count())
                .map(|c| index.cell(region, c))
                .filter(|&cell| input.harvest_fraction[cell] != 0.0)
                .map(|cell| {
                    let weight = drain * input.harvest_fraction[cell] / UNIT_FACTOR;
                    (layout.var(DomainKind::Supply, cell), weight)
                })
                .collect();
            qp.push_leq(&coeffs, forest.stock[region].max(0.0));
        }
    })
}

/// Global trade closure and pinning of Rest of World trade to its calibrated values
pub fn rest_of_world(input: &ModelInput<'_>, layout: &VariableLayout, qp: &mut QpBuilder) -> RestOfWorldHandle {
    let index = &input.world.index;
    let row = index.rest_of_world();
    let commodities = index.commodity_count();

    let closure = qp.block(|qp| {
        for c in 0..commodities {
            let mut coeffs = Vec::with_capacity(2 * index.region_count());
            for cell in index.commodity_cells(c) {
                coeffs.push((layout.var(DomainKind::Import, cell), 1.0));
                coeffs.push((layout.var(DomainKind::Export, cell), -1.0));
            }
            let row_cell = index.cell(row, c);
            coeffs.push((layout.var(DomainKind::Import, row_cell), 1.0));
            coeffs.push((layout.var(DomainKind::Export, row_cell), -1.0));
            qp.push_eq(&coeffs, 0.0);
        }
    });

    let pin = |kind: DomainKind, qp: &mut QpBuilder| {
        let quantity = input.market.quantity(kind);
        qp.block(|qp| {
            for c in 0..commodities {
                let cell = index.cell(row, c);
                qp.push_eq(&[(layout.var(kind, cell), 1.0)], quantity[cell]);
            }
        })
    };
    let export_pin = pin(DomainKind::Export, qp);
    let import_pin = pin(DomainKind::Import, qp);

    RestOfWorldHandle { closure, export_pin, import_pin }
}

/// Aggregate balance per commodity group over real regions plus Rest of World trade
pub fn global_balance(ctx: &BalanceContext<'_>, qp: &mut QpBuilder) -> RowRange {
    let index = ctx.index;
    let layout = ctx.layout;
    let row = index.rest_of_world();
    qp.block(|qp| {
        for group in CommodityGroup::all() {
            let members = ctx.groups.members(group);
            if members.is_empty() {
                continue;
            }
            let mut coeffs = Vec::new();
            for &c in &members {
                for cell in index.commodity_cells(c) {
                    coeffs.extend(super::strategies::cell_balance(ctx, cell, group));
                }
                let row_cell = index.cell(row, c);
                if group != CommodityGroup::OtherRoundwood {
                    coeffs.push((layout.var(DomainKind::Import, row_cell), 1.0));
                    coeffs.push((layout.var(DomainKind::Export, row_cell), -1.0));
                }
            }
            qp.push_eq(&coeffs, 0.0);
        }
    })
}

/// Demand floor for regions holding forest stock, demand ceiling everywhere
pub fn demand_bounds(input: &ModelInput<'_>, layout: &VariableLayout, qp: &mut QpBuilder) -> RowRange {
    let index = &input.world.index;
    let lower = input.bounds.lower(DomainKind::Demand);
    let upper = input.bounds.upper(DomainKind::Demand);
    qp.block(|qp| {
        for cell in 0..index.len() {
            let var = layout.var(DomainKind::Demand, cell);
            if input.market.forest.stock[index.region_of(cell)] > 0.0 {
                qp.push_geq(&[(var, 1.0)], lower[cell]);
            }
            qp.push_leq(&[(var, 1.0)], upper[cell]);
        }
    })
}

/// Every quantity is non-negative
pub fn nonnegativity(layout: &VariableLayout, qp: &mut QpBuilder) -> RowRange {
    qp.block(|qp| {
        for var in 0..layout.quantity_vars() {
            qp.push_geq(&[(var, 1.0)], 0.0);
        }
    })
}
