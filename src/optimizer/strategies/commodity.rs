use crate::config::MaterialBalanceMode;
use crate::optimizer::{MaterialBalanceHandle, QpBuilder};

use super::{cell_balance, BalanceContext, MaterialBalanceStrategy};

/// Balance rows per commodity, stacked over the real regions
pub struct CommodityBalance;

impl MaterialBalanceStrategy for CommodityBalance {
    fn mode(&self) -> MaterialBalanceMode {
        MaterialBalanceMode::Commodity
    }

    fn build(&self, ctx: &BalanceContext<'_>, qp: &mut QpBuilder) -> MaterialBalanceHandle {
        let blocks = (0..ctx.index.commodity_count())
            .map(|commodity| {
                let group = ctx.groups.group_of(commodity)?;
                Some(qp.block(|qp| {
                    for cell in ctx.index.commodity_cells(commodity) {
                        let coeffs = cell_balance(ctx, cell, group);
                        qp.push_eq(&coeffs, 0.0);
                    }
                }))
            })
            .collect();
        MaterialBalanceHandle::Commodity { blocks }
    }
}
