use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::BaseIndex;
use crate::domain::{CommodityGroup, WorldInput};

/// Assignment of commodities (by index position) to product groups.
///
/// Derived from which commodities appear as IO inputs, in trade, in supply,
/// in demand and in manufacturing. Each commodity belongs to at most one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommodityGroups {
    pub fuelwood: Option<usize>,
    pub other_roundwood: Option<usize>,
    pub raw: BTreeSet<usize>,
    pub intermediate: BTreeSet<usize>,
    pub final_products: BTreeSet<usize>,
    /// Supply commodities harvested from forest stock
    pub forest_raw: BTreeSet<usize>,
}

impl CommodityGroups {
    pub fn derive(index: &BaseIndex, input: &WorldInput) -> Self {
        let position = |code: u32| index.commodity_position(code);
        let is_real = |region: &str| {
            index
                .region_position(region)
                .map(|r| r != index.rest_of_world())
                .unwrap_or(false)
        };

        let io_inputs: BTreeSet<usize> = input
            .manufacture_coefficients
            .iter()
            .filter_map(|rec| position(rec.input))
            .collect();
        let traded: BTreeSet<usize> = input
            .export
            .iter()
            .filter_map(|rec| position(rec.commodity))
            .collect();
        let produced: BTreeSet<usize> = input
            .manufacture_cost
            .iter()
            .filter_map(|rec| position(rec.commodity))
            .collect();
        let supplied: BTreeSet<usize> = input
            .supply
            .iter()
            .filter(|rec| is_real(&rec.region))
            .filter_map(|rec| position(rec.commodity))
            .collect();
        let demanded: BTreeSet<usize> = input
            .demand
            .iter()
            .filter(|rec| is_real(&rec.region))
            .filter_map(|rec| position(rec.commodity))
            .collect();

        let all = 0..index.commodity_count();
        let fuelwood = all
            .clone()
            .find(|c| !io_inputs.contains(c) && traded.contains(c) && !produced.contains(c));
        let other_roundwood = all
            .clone()
            .find(|c| !io_inputs.contains(c) && !traded.contains(c) && Some(*c) != fuelwood);

        let special: BTreeSet<usize> = fuelwood.into_iter().chain(other_roundwood).collect();
        let raw: BTreeSet<usize> = supplied.difference(&special).copied().collect();
        let final_products: BTreeSet<usize> = demanded
            .iter()
            .filter(|c| !special.contains(c) && !raw.contains(c))
            .copied()
            .collect();
        let intermediate: BTreeSet<usize> = produced
            .iter()
            .filter(|c| !special.contains(c) && !raw.contains(c) && !final_products.contains(c))
            .copied()
            .collect();

        let forest_raw = match other_roundwood {
            Some(other) => {
                let ceiling = index.commodities()[other].code;
                supplied
                    .iter()
                    .filter(|&&c| index.commodities()[c].code <= ceiling)
                    .copied()
                    .collect()
            }
            None => supplied.clone(),
        };

        Self {
            fuelwood,
            other_roundwood,
            raw,
            intermediate,
            final_products,
            forest_raw,
        }
    }

    pub fn group_of(&self, commodity: usize) -> Option<CommodityGroup> {
        if self.fuelwood == Some(commodity) {
            Some(CommodityGroup::Fuelwood)
        } else if self.other_roundwood == Some(commodity) {
            Some(CommodityGroup::OtherRoundwood)
        } else if self.raw.contains(&commodity) {
            Some(CommodityGroup::Raw)
        } else if self.final_products.contains(&commodity) {
            Some(CommodityGroup::Final)
        } else if self.intermediate.contains(&commodity) {
            Some(CommodityGroup::Intermediate)
        } else {
            None
        }
    }

    pub fn members(&self, group: CommodityGroup) -> Vec<usize> {
        match group {
            CommodityGroup::Raw => self.raw.iter().copied().collect(),
            CommodityGroup::Intermediate => self.intermediate.iter().copied().collect(),
            CommodityGroup::Final => self.final_products.iter().copied().collect(),
            CommodityGroup::Fuelwood => self.fuelwood.into_iter().collect(),
            CommodityGroup::OtherRoundwood => self.other_roundwood.into_iter().collect(),
        }
    }

    /// Share of each cell's supply drawn from forest stock.
    ///
    /// Fuelwood takes the region's fuelwood fraction, the other forest raw
    /// commodities count fully, everything else is not harvested.
    pub fn harvest_fraction(&self, index: &BaseIndex, fuelwood_fraction: &[f64]) -> Vec<f64> {
        index
            .pairs()
            .map(|(r, c)| {
                if self.fuelwood == Some(c) {
                    fuelwood_fraction.get(r).copied().unwrap_or(1.0)
                } else if self.forest_raw.contains(&c) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}
