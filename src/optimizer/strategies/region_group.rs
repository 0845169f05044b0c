use std::collections::BTreeMap;

use crate::config::MaterialBalanceMode;
use crate::domain::CommodityGroup;
use crate::optimizer::{MaterialBalanceHandle, QpBuilder};

use super::{cell_balance, BalanceContext, MaterialBalanceStrategy};

/// Balance rows per region, one block for each commodity group
pub struct RegionGroupBalance;

impl MaterialBalanceStrategy for RegionGroupBalance {
    fn mode(&self) -> MaterialBalanceMode {
        MaterialBalanceMode::RegionGroup
    }

    fn build(&self, ctx: &BalanceContext<'_>, qp: &mut QpBuilder) -> MaterialBalanceHandle {
        let members: Vec<(CommodityGroup, Vec<usize>)> = CommodityGroup::all()
            .map(|group| (group, ctx.groups.members(group)))
            .filter(|(_, m)| !m.is_empty())
            .collect();

        let mut blocks = BTreeMap::new();
        for region in 0..ctx.index.real_region_count() {
            for (group, commodities) in &members {
                let range = qp.block(|qp| {
                    for &commodity in commodities {
                        let cell = ctx.index.cell(region, commodity);
                        let coeffs = cell_balance(ctx, cell, *group);
                        qp.push_eq(&coeffs, 0.0);
                    }
                });
                blocks.insert((region, *group), range);
            }
        }
        MaterialBalanceHandle::RegionGroup { blocks }
    }
}
