//! Period-to-period shifts of demand, supply, manufacturing and transport.

use std::collections::HashMap;
use tracing::debug;

use super::{change, growth, update, ForestGrowth, KEEP, KEEP_OR_SWITCH};
use crate::alignment::{BaseIndex, ExogenousBlock, PeriodInfo, TradeChange};
use crate::config::CommodityConventions;
use crate::domain::{CoefficientRecord, DemandTable, Market, SupplyTable, TradeTable};
use crate::pricing::transport_cost;

/// Shift demand by trend, GDP and expectation growth
pub fn dynamize_demand(demand: &mut DemandTable, block: &ExogenousBlock, period: &PeriodInfo) {
    let change = &block.demand;
    let len = period.length;

    let trend = growth(&demand.quantity, &change.growth, None, None, len);
    let elasticity = update(&demand.elasticity, &change.elasticity, KEEP);
    let gdp_elasticity = update(&demand.gdp_elasticity, &change.gdp_elasticity, KEEP);
    let gdp_growth = growth(&demand.gdp_elasticity, &change.gdp_growth, None, None, len);
    let expected = growth(&demand.expectations, &change.expected_growth, None, None, len);

    for i in 0..demand.quantity.len() {
        let shift = 1.0 + trend[i] + gdp_elasticity[i] * gdp_growth[i] + demand.expectations[i] * expected[i];
        demand.quantity[i] *= shift;
        demand.lower_bound[i] *= (1.0 + change.lower_bound_growth[i]).powi(len as i32);
    }
    demand.elasticity = elasticity;
    demand.gdp_elasticity = gdp_elasticity;
}

/// Shift supply and set the periodic growth rate of its upper bound.
///
/// Paper-type commodities follow GDP, forest-based commodities follow the
/// region's realised forest stock and area change.
pub fn dynamize_supply(
    index: &BaseIndex,
    supply: &mut SupplyTable,
    forest: &ForestGrowth,
    block: &ExogenousBlock,
    period: &PeriodInfo,
    conventions: &CommodityConventions,
) {
    let change = &block.supply;
    let len = period.length;

    supply.elasticity = update(&supply.elasticity, &change.elasticity, KEEP);
    supply.gdp_elasticity = update(&supply.gdp_elasticity, &change.gdp_elasticity, KEEP);
    supply.stock_elasticity = update(&supply.stock_elasticity, &change.stock_elasticity, KEEP);
    supply.area_elasticity = update(&supply.area_elasticity, &change.area_elasticity, KEEP);

    let trend = growth(&supply.quantity, &change.growth, None, None, len);
    let gdp_growth = growth(&supply.quantity, &change.gdp_growth, None, None, len);

    let mut shifter = vec![0.0; supply.quantity.len()];
    for cell in 0..supply.quantity.len() {
        let region = index.region_of(cell);
        let shift = if index.commodity_code(cell) >= conventions.paper_supply_code {
            1.0 + supply.gdp_elasticity[cell] * gdp_growth[cell]
        } else {
            1.0 + supply.stock_elasticity[cell] * forest.stock_rate.get(region).copied().unwrap_or(0.0)
                + supply.area_elasticity[cell] * forest.area_rate.get(region).copied().unwrap_or(0.0)
        };
        shifter[cell] = shift * (1.0 + trend[cell]) - 1.0;
        supply.quantity[cell] = (supply.quantity[cell] * shift * (1.0 + trend[cell])).max(0.0);
    }

    supply.upper_bound_growth = growth(
        &supply.upper_bound,
        &change.upper_bound_growth,
        Some(KEEP_OR_SWITCH),
        Some(&shifter),
        len,
    );
}

/// Grow manufacturing cost and move IO coefficients by their additive change
pub fn dynamize_manufacture(market: &mut Market, block: &ExogenousBlock, period: &PeriodInfo) {
    let len = period.length;
    let manufacture = &mut market.manufacture;
    let cost_growth = growth(&manufacture.cost, &block.manufacture_cost_growth, None, None, len);
    for (cost, g) in manufacture.cost.iter_mut().zip(&cost_growth) {
        *cost *= 1.0 + g;
    }

    if block.coefficient_change.is_empty() {
        return;
    }
    let rates: Vec<f64> = block.coefficient_change.iter().map(|c| c.coefficient).collect();
    let deltas = change(&rates, len);
    let mut position: HashMap<(String, u32, u32), usize> = market
        .coefficients
        .iter()
        .enumerate()
        .map(|(i, c)| ((c.region.clone(), c.input, c.output), i))
        .collect();

    let mut added = 0usize;
    for (rec, delta) in block.coefficient_change.iter().zip(deltas) {
        let key = (rec.region.clone(), rec.input, rec.output);
        match position.get(&key) {
            Some(&i) => {
                let coefficient = &mut market.coefficients[i].coefficient;
                *coefficient = (*coefficient + delta).max(0.0);
            }
            None => {
                position.insert(key, market.coefficients.len());
                market.coefficients.push(CoefficientRecord {
                    region: rec.region.clone(),
                    input: rec.input,
                    output: rec.output,
                    coefficient: delta.max(0.0),
                });
                added += 1;
            }
        }
    }
    if added > 0 {
        debug!(added, "IO coefficients introduced by exogenous change");
    }
}

fn dynamize_trade_side(table: &mut TradeTable, change_block: &TradeChange, len: u32) {
    table.trade_inertia = update(&table.trade_inertia, &change_block.trade_inertia, KEEP);
    table.elasticity = update(&table.elasticity, &change_block.elasticity, KEEP);
    for (value, delta) in table.freight_cost.iter_mut().zip(change(&change_block.freight_change, len)) {
        *value += delta;
    }
    for (value, delta) in table.import_tax_rate.iter_mut().zip(change(&change_block.import_tax_change, len)) {
        *value += delta;
    }
    for (value, delta) in table.export_tax_rate.iter_mut().zip(change(&change_block.export_tax_change, len)) {
        *value += delta;
    }
}

/// Update trade inertia, elasticities, freight and tax rates, then refresh transport cost
pub fn dynamize_transport(market: &mut Market, block: &ExogenousBlock, period: &PeriodInfo) {
    dynamize_trade_side(&mut market.import, &block.import, period.length);
    dynamize_trade_side(&mut market.export, &block.export, period.length);
    market.import.transport_cost = transport_cost(&market.import, &market.export);
}
