//! Tabular views over the recorded period history.

use chrono::{DateTime, Utc};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::{PeriodState, RunFailure};
use crate::alignment::BaseIndex;
use crate::domain::DomainKind;

/// Name of the aggregate row summing every real region
pub const GLOBAL_CONTINENT: &str = "Global";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPriceRow {
    pub period: usize,
    pub year: i32,
    pub commodity: u32,
    pub price: f64,
}

/// Solved price and quantity of one cell and domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRow {
    pub region: String,
    pub commodity: u32,
    pub domain: DomainKind,
    pub period: usize,
    pub year: i32,
    pub price: f64,
    pub quantity: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRow {
    pub region: String,
    pub period: usize,
    pub year: i32,
    pub stock: f64,
    pub area: f64,
    pub gdp_per_capita: f64,
    pub area_rate: f64,
    pub stock_rate: f64,
    pub supply_from_forest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufactureRow {
    pub region: String,
    pub commodity: u32,
    pub period: usize,
    pub year: i32,
    pub quantity: f64,
    pub manufacturing_cost: f64,
    pub raw_material_cost: f64,
    pub total_production_cost: f64,
}

/// Quantity sum and quantity-weighted price over a continent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentRow {
    pub continent: String,
    pub commodity: u32,
    pub domain: DomainKind,
    pub period: usize,
    pub year: i32,
    pub quantity: f64,
    pub price: f64,
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub generated_at: DateTime<Utc>,
    pub periods_completed: usize,
    pub failure: Option<RunFailure>,
    pub world_prices: Vec<WorldPriceRow>,
    pub results: Vec<DomainRow>,
    pub forest: Vec<ForestRow>,
    pub manufacture: Vec<ManufactureRow>,
    /// `None` when a real region carries no continent
    pub continents: Option<Vec<ContinentRow>>,
}

impl RunOutput {
    pub fn build(index: &BaseIndex, history: &[PeriodState], failure: Option<RunFailure>) -> Self {
        Self {
            generated_at: Utc::now(),
            periods_completed: history.len(),
            failure,
            world_prices: world_prices(index, history),
            results: domain_rows(index, history),
            forest: forest_rows(index, history),
            manufacture: manufacture_rows(index, history),
            continents: continent_rows(index, history),
        }
    }
}

pub fn world_prices(index: &BaseIndex, history: &[PeriodState]) -> Vec<WorldPriceRow> {
    history
        .iter()
        .flat_map(|state| {
            index.commodities().iter().zip(&state.result.world_price).map(move |(c, &price)| WorldPriceRow {
                period: state.period(),
                year: state.year(),
                commodity: c.code,
                price,
            })
        })
        .collect()
}

pub fn domain_rows(index: &BaseIndex, history: &[PeriodState]) -> Vec<DomainRow> {
    let mut rows = Vec::with_capacity(history.len() * index.len() * 5);
    for state in history {
        for (kind, cell) in iproduct!(DomainKind::all(), 0..index.len()) {
            rows.push(DomainRow {
                region: index.regions()[index.region_of(cell)].code.clone(),
                commodity: index.commodity_code(cell),
                domain: kind,
                period: state.period(),
                year: state.year(),
                price: state.market.price(kind)[cell],
                quantity: state.market.quantity(kind)[cell],
                lower_bound: state.bounds.lower(kind)[cell],
                upper_bound: state.bounds.upper(kind)[cell],
            });
        }
    }
    rows
}

pub fn forest_rows(index: &BaseIndex, history: &[PeriodState]) -> Vec<ForestRow> {
    let mut rows = Vec::new();
    for state in history {
        let forest = &state.market.forest;
        for (r, region) in index.regions().iter().enumerate().take(index.real_region_count()) {
            rows.push(ForestRow {
                region: region.code.clone(),
                period: state.period(),
                year: state.year(),
                stock: forest.stock[r],
                area: forest.area[r],
                gdp_per_capita: forest.gdp_per_capita[r],
                area_rate: forest.area_rate[r],
                stock_rate: forest.stock_rate[r],
                supply_from_forest: forest.supply_from_forest[r],
            });
        }
    }
    rows
}

pub fn manufacture_rows(index: &BaseIndex, history: &[PeriodState]) -> Vec<ManufactureRow> {
    let mut rows = Vec::new();
    for state in history {
        let manufacture = &state.market.manufacture;
        for cell in index.real_cells() {
            rows.push(ManufactureRow {
                region: index.regions()[index.region_of(cell)].code.clone(),
                commodity: index.commodity_code(cell),
                period: state.period(),
                year: state.year(),
                quantity: manufacture.quantity[cell],
                manufacturing_cost: manufacture.cost[cell],
                raw_material_cost: manufacture.raw_material_cost[cell],
                total_production_cost: manufacture.total_production_cost[cell],
            });
        }
    }
    rows
}

#[derive(Default)]
struct Aggregate {
    quantity: f64,
    value: f64,
}

/// Continent aggregation plus a global row; skipped when any real region lacks a continent
pub fn continent_rows(index: &BaseIndex, history: &[PeriodState]) -> Option<Vec<ContinentRow>> {
    let real = &index.regions()[..index.real_region_count()];
    if let Some(missing) = real.iter().find(|r| r.continent.is_none()) {
        info!(region = %missing.code, "Continent aggregation skipped, region without continent");
        return None;
    }

    let mut rows = Vec::new();
    for state in history {
        let mut totals: BTreeMap<(String, u32, DomainKind), Aggregate> = BTreeMap::new();
        for (kind, cell) in iproduct!(DomainKind::all(), index.real_cells()) {
            let region = &index.regions()[index.region_of(cell)];
            let quantity = state.market.quantity(kind)[cell];
            let price = state.market.price(kind)[cell];
            let commodity = index.commodity_code(cell);
            let continent = region.continent.clone().unwrap_or_default();
            for name in [continent, GLOBAL_CONTINENT.to_string()] {
                let entry = totals.entry((name, commodity, kind)).or_default();
                entry.quantity += quantity;
                entry.value += quantity * price;
            }
        }
        rows.extend(totals.into_iter().map(|((continent, commodity, domain), agg)| ContinentRow {
            continent,
            commodity,
            domain,
            period: state.period(),
            year: state.year(),
            quantity: agg.quantity,
            price: if agg.quantity > 0.0 { agg.value / agg.quantity } else { 0.0 },
        }));
    }
    Some(rows)
}
