use std::collections::BTreeMap;
use std::ops::Range;

use super::RowRange;
use crate::alignment::{BaseIndex, CommodityGroups, IoMatrix, PeriodInfo, World};
use crate::bounds::Bounds;
use crate::calibration::Calibration;
use crate::config::MaterialBalanceMode;
use crate::domain::{CommodityGroup, DomainKind, Market, DOMAIN_BLOCKS};

/// Column layout: five domain blocks of length L, then auxiliary variables
#[derive(Debug, Clone, PartialEq)]
pub struct VariableLayout {
    pub cells: usize,
    /// Upper/lower deviation variables per penalized trade lane
    pub deviations: Vec<TradeDeviation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeDeviation {
    /// Column of the penalized trade quantity
    pub quantity: usize,
    pub upper: usize,
    pub lower: usize,
}

impl VariableLayout {
    pub fn new(cells: usize) -> Self {
        Self { cells, deviations: Vec::new() }
    }

    pub fn var(&self, kind: DomainKind, cell: usize) -> usize {
        kind.block() * self.cells + cell
    }

    pub fn block(&self, kind: DomainKind) -> Range<usize> {
        let start = kind.block() * self.cells;
        start..start + self.cells
    }

    pub fn quantity_vars(&self) -> usize {
        DOMAIN_BLOCKS * self.cells
    }
}

/// Everything the model builder reads for one period
pub struct ModelInput<'a> {
    pub world: &'a World,
    pub market: &'a Market,
    pub io: &'a IoMatrix,
    pub calibration: &'a Calibration,
    pub bounds: &'a Bounds,
    pub harvest_fraction: &'a [f64],
    pub period: &'a PeriodInfo,
    /// World price of the preceding period weighting the trade penalty
    pub previous_world_price: &'a [f64],
    pub material_balance: MaterialBalanceMode,
    pub global_material_balance: bool,
}

/// Rows of the trade bound block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeHandle {
    pub hard: RowRange,
    pub deviation: RowRange,
}

/// Rest of World closure and pinning rows, one per commodity each
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RestOfWorldHandle {
    pub closure: RowRange,
    pub export_pin: RowRange,
    pub import_pin: RowRange,
}

/// Row layout of the material balance block for each granularity
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialBalanceHandle {
    /// Row per real-region cell, `None` for cells without a group
    RegionCommodity { rows: Vec<Option<usize>> },
    /// Rows per (region, group), one per group member in member order
    RegionGroup { blocks: BTreeMap<(usize, CommodityGroup), RowRange> },
    /// Rows per commodity, one per real region in region order
    Commodity { blocks: Vec<Option<RowRange>> },
}

impl MaterialBalanceHandle {
    /// Row governing a cell, if any
    pub fn cell_row(&self, index: &BaseIndex, groups: &CommodityGroups, cell: usize) -> Option<usize> {
        if index.is_rest_of_world_cell(cell) {
            return None;
        }
        let region = index.region_of(cell);
        let commodity = index.commodity_of(cell);
        match self {
            MaterialBalanceHandle::RegionCommodity { rows } => rows.get(cell).copied().flatten(),
            MaterialBalanceHandle::RegionGroup { blocks } => {
                let group = groups.group_of(commodity)?;
                let range = blocks.get(&(region, group))?;
                let offset = groups.members(group).iter().position(|&c| c == commodity)?;
                Some(range.start + offset)
            }
            MaterialBalanceHandle::Commodity { blocks } => {
                let range = blocks.get(commodity).copied().flatten()?;
                Some(range.start + region)
            }
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            MaterialBalanceHandle::RegionCommodity { rows } => rows.iter().flatten().count(),
            MaterialBalanceHandle::RegionGroup { blocks } => blocks.values().map(|r| r.len).sum(),
            MaterialBalanceHandle::Commodity { blocks } => blocks.iter().flatten().map(|r| r.len).sum(),
        }
    }
}

/// Typed handles of every constraint block, used for dual lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandles {
    pub trade: TradeHandle,
    pub supply_upper: RowRange,
    pub manufacture_upper: RowRange,
    pub max_harvest: RowRange,
    pub material_balance: MaterialBalanceHandle,
    pub rest_of_world: RestOfWorldHandle,
    pub global_balance: Option<RowRange>,
    pub demand_bounds: RowRange,
    pub nonnegativity: RowRange,
}
