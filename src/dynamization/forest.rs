//! Endogenous forest area and stock growth.

use tracing::{info, warn};

use super::{growth, update, KEEP, KEEP_OR_SWITCH};
use crate::alignment::{BaseIndex, CommodityGroups, ExogenousBlock, PeriodInfo};
use crate::constants::{FOREST_FLOOR, UNIT_FACTOR};
use crate::domain::{ForestTable, SupplyTable};

/// Realised periodic change rates of each region's forest, fed into the supply shift
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForestGrowth {
    pub stock_rate: Vec<f64>,
    pub area_rate: Vec<f64>,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Roundwood drawn from each region's forest over the period, in stock units
pub fn roundwood_harvest(
    index: &BaseIndex,
    harvest_fraction: &[f64],
    supply: &SupplyTable,
    length: u32,
) -> Vec<f64> {
    let mut harvest = vec![0.0; index.region_count()];
    for (cell, (&q, &fraction)) in supply.quantity.iter().zip(harvest_fraction).enumerate() {
        harvest[index.region_of(cell)] += q * fraction;
    }
    harvest.iter().map(|h| h * length as f64 / UNIT_FACTOR).collect()
}

/// Grow forest area and stock over one period.
///
/// Regions without any forest (stock and area both non-positive) keep their
/// state and report zero growth.
pub fn dynamize_forest(
    index: &BaseIndex,
    groups: &CommodityGroups,
    forest: &mut ForestTable,
    supply: &SupplyTable,
    block: &ExogenousBlock,
    period: &PeriodInfo,
) -> ForestGrowth {
    let change = &block.forest;
    let len = period.length;
    let regions = forest.stock.len();

    let gdp_growth = growth(&forest.gdp_per_capita, &change.gdp_growth, None, None, len);
    let adjustment = growth(&forest.gdp_per_capita, &change.endogenous_adjustment, None, None, len);
    let co2_growth = growth(&forest.co2_price, &change.co2_price_growth, None, None, len);
    let stock_elasticity = update(&forest.stock_elasticity_area, &change.stock_elasticity_area, KEEP);
    let area_linear = update(&forest.area_gdp_linear, &change.area_gdp_linear, KEEP);
    let area_square = update(&forest.area_gdp_square, &change.area_gdp_square, KEEP);
    let fuelwood_fraction = update(&forest.fuelwood_fraction, &change.fuelwood_fraction, KEEP_OR_SWITCH);
    let inventory_drain = update(&forest.inventory_drain, &change.inventory_drain, KEEP_OR_SWITCH);
    let max_inventory_drain = update(&forest.max_inventory_drain, &change.max_inventory_drain, KEEP);

    for (r, stock) in forest.stock.iter_mut().enumerate() {
        if *stock < 0.0 {
            warn!(region = %index.regions()[r].code, stock = *stock, "Negative forest stock set to zero");
            *stock = 0.0;
        }
    }
    for (r, area) in forest.area.iter_mut().enumerate() {
        if *area < 0.0 {
            warn!(region = %index.regions()[r].code, area = *area, "Negative forest area set to zero");
            *area = 0.0;
        }
    }

    // harvest is drawn with the fraction in effect during the solved period
    let harvest_fraction = groups.harvest_fraction(index, &forest.fuelwood_fraction);
    let roundwood = roundwood_harvest(index, &harvest_fraction, supply, len);

    let mut out = ForestGrowth {
        stock_rate: vec![0.0; regions],
        area_rate: vec![0.0; regions],
    };
    let mut periodic_area = vec![0.0; regions];
    let mut periodic_stock = vec![0.0; regions];

    let gdp: Vec<f64> = (0..regions)
        .map(|r| forest.gdp_per_capita[r] / UNIT_FACTOR * (1.0 + gdp_growth[r]))
        .collect();
    let area_growth: Vec<f64> = (0..regions)
        .map(|r| (forest.alpha[r] + area_linear[r] * gdp[r]) * (area_square[r] * gdp[r]).exp())
        .collect();
    let area_periodic = growth(&area_growth, &change.area_change, Some(KEEP_OR_SWITCH), None, len);

    let stock_growth: Vec<f64> = (0..regions)
        .map(|r| {
            let stock = if forest.stock[r] == 0.0 { FOREST_FLOOR } else { forest.stock[r] };
            finite_or_zero(forest.gamma[r] * (stock / forest.area[r]).powf(stock_elasticity[r]))
        })
        .collect();
    let stock_periodic = growth(&stock_growth, &change.stock_change, Some(KEEP_OR_SWITCH), None, len);

    let mut floored = 0usize;
    for r in 0..regions {
        if forest.stock[r] <= 0.0 && forest.area[r] <= 0.0 {
            continue;
        }
        let stock_prev = if forest.stock[r] == 0.0 { FOREST_FLOOR } else { forest.stock[r] };
        let area_prev = forest.area[r];

        let area_new = area_prev * (1.0 + area_periodic[r]);
        let stock_new = stock_prev + (area_periodic[r] + stock_periodic[r] + adjustment[r]) * stock_prev
            - inventory_drain[r] * roundwood[r];

        out.area_rate[r] = finite_or_zero((area_new - area_prev) / area_prev);
        out.stock_rate[r] = finite_or_zero((stock_new - stock_prev) / stock_prev);

        if stock_new < FOREST_FLOOR || area_new < FOREST_FLOOR {
            floored += 1;
        }
        forest.stock[r] = stock_new.max(FOREST_FLOOR);
        forest.area[r] = area_new.max(FOREST_FLOOR);
        periodic_area[r] = area_periodic[r];
        periodic_stock[r] = stock_periodic[r];
    }
    if floored > 0 {
        info!(period = period.period, floored, "Forest stock or area floored at minimum");
    }

    for r in 0..regions {
        forest.gdp_per_capita[r] = gdp[r] * UNIT_FACTOR;
        forest.co2_price[r] *= 1.0 + co2_growth[r];
    }
    forest.stock_elasticity_area = stock_elasticity;
    forest.area_gdp_linear = area_linear;
    forest.area_gdp_square = area_square;
    forest.fuelwood_fraction = fuelwood_fraction;
    forest.inventory_drain = inventory_drain;
    forest.max_inventory_drain = max_inventory_drain;
    forest.area_rate = periodic_area;
    forest.stock_rate = periodic_stock;
    forest.supply_from_forest = roundwood;

    out
}
