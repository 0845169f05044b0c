use crate::config::MaterialBalanceMode;
use crate::optimizer::{MaterialBalanceHandle, QpBuilder};

use super::{cell_balance, BalanceContext, MaterialBalanceStrategy};

/// One balance row per (region, commodity), in cell order
pub struct RegionCommodityBalance;

impl MaterialBalanceStrategy for RegionCommodityBalance {
    fn mode(&self) -> MaterialBalanceMode {
        MaterialBalanceMode::RegionCommodity
    }

    fn build(&self, ctx: &BalanceContext<'_>, qp: &mut QpBuilder) -> MaterialBalanceHandle {
        let mut rows = vec![None; ctx.index.len()];
        for cell in ctx.index.real_cells() {
            if let Some(group) = ctx.groups.group_of(ctx.index.commodity_of(cell)) {
                let coeffs = cell_balance(ctx, cell, group);
                rows[cell] = Some(qp.push_eq(&coeffs, 0.0));
            }
        }
        MaterialBalanceHandle::RegionCommodity { rows }
    }
}
