//! Per-period lower and upper bounds in optimization vector order.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alignment::{PeriodInfo, World};
use crate::config::CommodityConventions;
use crate::constants::{
    BOUND_OMITTED, DEMAND_HEADROOM, MANUFACTURE_SLACK, MIN_FOREST_STOCK, TRADE_INERTIA_DEVIATION,
    TRADE_INERTIA_DEVIATION_ROW,
};
use crate::domain::{DomainKind, Market, TradeTable, DOMAIN_BLOCKS};

/// Bounds over the full optimization vector (5 x L)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    cells: usize,
}

impl Bounds {
    pub fn lower(&self, kind: DomainKind) -> &[f64] {
        let start = kind.block() * self.cells;
        &self.lower[start..start + self.cells]
    }

    pub fn upper(&self, kind: DomainKind) -> &[f64] {
        let start = kind.block() * self.cells;
        &self.upper[start..start + self.cells]
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Assemble from per-domain blocks given in vector order
    pub fn from_blocks(cells: usize, blocks: [(Vec<f64>, Vec<f64>); DOMAIN_BLOCKS]) -> Self {
        let mut lower = Vec::with_capacity(cells * DOMAIN_BLOCKS);
        let mut upper = Vec::with_capacity(cells * DOMAIN_BLOCKS);
        for (lb, ub) in blocks {
            lower.extend(lb);
            upper.extend(ub);
        }
        Self { lower, upper, cells }
    }
}

/// Recycled paper available as wastepaper supply, per cell
pub fn recycled_paper(world: &World, market: &Market, conventions: &CommodityConventions) -> Vec<f64> {
    let index = &world.index;
    let mut recycled = vec![0.0; index.len()];
    let Some(wastepaper) = index.commodity_position(conventions.wastepaper_code) else {
        return recycled;
    };
    for r in 0..index.real_region_count() {
        let recovered: f64 = (0..index.commodity_count())
            .filter(|&c| index.commodities()[c].code > conventions.paper_code_floor)
            .map(|c| {
                let cell = index.cell(r, c);
                market.demand.quantity[cell] * market.recycling.recovery_upper[cell]
            })
            .sum();
        recycled[index.cell(r, wastepaper)] = recovered;
    }
    recycled
}

fn trade_band(world: &World, trade: &TradeTable, exponent: i32) -> (Vec<f64>, Vec<f64>) {
    let index = &world.index;
    let mut lower = Vec::with_capacity(index.len());
    let mut upper = Vec::with_capacity(index.len());
    for cell in 0..index.len() {
        let deviation = if index.is_rest_of_world_cell(cell) {
            TRADE_INERTIA_DEVIATION_ROW
        } else {
            TRADE_INERTIA_DEVIATION
        };
        let inertia = trade.trade_inertia[cell];
        let q = trade.quantity[cell];
        lower.push(q * (1.0 - inertia - deviation).powi(exponent));
        upper.push(q * (1.0 + inertia + deviation).powi(exponent));
    }
    (lower, upper)
}

/// Compute every bound for one period
pub fn compute_bounds(
    world: &World,
    market: &Market,
    period: &PeriodInfo,
    dynamization: bool,
    conventions: &CommodityConventions,
) -> Bounds {
    let index = &world.index;
    let len = index.len();
    let row = |cell: usize| index.is_rest_of_world_cell(cell);

    let demand_upper: Vec<f64> = market.demand.quantity.iter().map(|q| q * DEMAND_HEADROOM).collect();
    let demand_lower: Vec<f64> = (0..len)
        .map(|cell| if row(cell) { 0.0 } else { market.demand.lower_bound[cell] })
        .collect();

    let exponent = if period.period == 0 { 1 } else { period.length as i32 };
    let (mut export_lower, export_upper) = trade_band(world, &market.export, exponent);
    let (import_lower, import_upper) = trade_band(world, &market.import, exponent);
    if period.period > 0 {
        for cell in index.real_cells() {
            if market.forest.stock[index.region_of(cell)] <= MIN_FOREST_STOCK {
                export_lower[cell] = 0.0;
            }
        }
    }

    let manufacture_lower = vec![0.0; len];
    let manufacture_upper: Vec<f64> = (0..len)
        .map(|cell| {
            if row(cell) || market.manufacture.cost[cell] == 0.0 {
                0.0
            } else {
                market.manufacture.quantity[cell] * MANUFACTURE_SLACK
            }
        })
        .collect();

    let supply_lower = market.supply.lower_bound.clone();
    let recycled = if period.period == 0 {
        vec![0.0; len]
    } else {
        recycled_paper(world, market, conventions)
    };
    let supply_upper: Vec<f64> = (0..len)
        .map(|cell| {
            if row(cell) {
                return 0.0;
            }
            let mut ub = market.supply.upper_bound[cell] + recycled[cell];
            if ub == 0.0 {
                ub = BOUND_OMITTED;
            }
            if period.period > 0 && dynamization {
                ub *= 1.0 + market.supply.upper_bound_growth[cell];
            }
            ub
        })
        .collect();

    let mut bounds = Bounds::from_blocks(
        len,
        [
            (demand_lower, demand_upper),
            (export_lower, export_upper),
            (import_lower, import_upper),
            (manufacture_lower, manufacture_upper),
            (supply_lower, supply_upper),
        ],
    );

    let negative = bounds
        .lower
        .iter()
        .chain(bounds.upper.iter())
        .filter(|b| **b < 0.0)
        .count();
    if negative > 0 {
        warn!(period = period.period, negative, "Negative bounds clipped to zero");
    }
    for b in bounds.lower.iter_mut().chain(bounds.upper.iter_mut()) {
        *b = b.max(0.0);
    }
    bounds
}
