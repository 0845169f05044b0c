//! Material Balance Strategies
//!
//! Three granularities of the same physical law:
//! - RegionCommodity: one row per (region, commodity) cell
//! - RegionGroup: rows grouped per (region, commodity group)
//! - Commodity: rows grouped per commodity across regions (default)
//!
//! Every strategy emits exactly one row per real-region cell that belongs to
//! a commodity group, so the feasible set is identical across modes.

pub mod commodity;
pub mod region_commodity;
pub mod region_group;

pub use commodity::*;
pub use region_commodity::*;
pub use region_group::*;

use crate::alignment::{BaseIndex, CommodityGroups, IoMatrix};
use crate::config::MaterialBalanceMode;
use crate::domain::{CommodityGroup, DomainKind};
use crate::optimizer::{MaterialBalanceHandle, QpBuilder, VariableLayout};

/// Data a strategy needs to lay out balance rows
pub struct BalanceContext<'a> {
    pub index: &'a BaseIndex,
    pub groups: &'a CommodityGroups,
    /// IO matrix without the Rest of World block
    pub io: &'a IoMatrix,
    pub layout: &'a VariableLayout,
}

pub trait MaterialBalanceStrategy: Send + Sync {
    fn mode(&self) -> MaterialBalanceMode;

    fn build(&self, ctx: &BalanceContext<'_>, qp: &mut QpBuilder) -> MaterialBalanceHandle;
}

pub fn strategy_for(mode: MaterialBalanceMode) -> Box<dyn MaterialBalanceStrategy> {
    match mode {
        MaterialBalanceMode::RegionCommodity => Box::new(RegionCommodityBalance),
        MaterialBalanceMode::RegionGroup => Box::new(RegionGroupBalance),
        MaterialBalanceMode::Commodity => Box::new(CommodityBalance),
    }
}

/// Inflow minus outflow of one real-region cell, as (column, coefficient)
pub fn cell_balance(ctx: &BalanceContext<'_>, cell: usize, group: CommodityGroup) -> Vec<(usize, f64)> {
    let layout = ctx.layout;
    let var = |kind: DomainKind| layout.var(kind, cell);
    let mut coeffs = Vec::with_capacity(8);

    let io_term = |coeffs: &mut Vec<(usize, f64)>| {
        let region = ctx.index.region_of(cell);
        let input = ctx.index.commodity_of(cell);
        let block = ctx.io.block(region);
        for output in 0..block.ncols() {
            let coefficient = block[(input, output)];
            if coefficient != 0.0 {
                let out_cell = ctx.index.cell(region, output);
                coeffs.push((layout.var(DomainKind::Manufacture, out_cell), -coefficient));
            }
        }
    };

    match group {
        CommodityGroup::Raw => {
            coeffs.push((var(DomainKind::Import), 1.0));
            coeffs.push((var(DomainKind::Supply), 1.0));
            io_term(&mut coeffs);
            coeffs.push((var(DomainKind::Export), -1.0));
        }
        CommodityGroup::Intermediate => {
            coeffs.push((var(DomainKind::Import), 1.0));
            coeffs.push((var(DomainKind::Manufacture), 1.0));
            io_term(&mut coeffs);
            coeffs.push((var(DomainKind::Export), -1.0));
        }
        CommodityGroup::Final => {
            coeffs.push((var(DomainKind::Import), 1.0));
            coeffs.push((var(DomainKind::Manufacture), 1.0));
            coeffs.push((var(DomainKind::Demand), -1.0));
            coeffs.push((var(DomainKind::Export), -1.0));
        }
        CommodityGroup::Fuelwood => {
            coeffs.push((var(DomainKind::Import), 1.0));
            coeffs.push((var(DomainKind::Supply), 1.0));
            coeffs.push((var(DomainKind::Demand), -1.0));
            coeffs.push((var(DomainKind::Export), -1.0));
        }
        CommodityGroup::OtherRoundwood => {
            coeffs.push((var(DomainKind::Supply), 1.0));
            coeffs.push((var(DomainKind::Demand), -1.0));
        }
    }
    coeffs
}

/// Residual of the balance law for one cell at a solution
pub fn cell_residual(ctx: &BalanceContext<'_>, cell: usize, group: CommodityGroup, x: &[f64]) -> f64 {
    cell_balance(ctx, cell, group)
        .iter()
        .map(|&(col, coeff)| coeff * x[col])
        .sum()
}
