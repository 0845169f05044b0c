use serde::{Deserialize, Serialize};

use super::BaseIndex;
use crate::domain::{CoefficientRecord, ExogenousPeriod};
use crate::dynamization::KEEP_OR_SWITCH;
use crate::error::EngineResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandChange {
    pub growth: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub gdp_elasticity: Vec<f64>,
    pub gdp_growth: Vec<f64>,
    pub expected_growth: Vec<f64>,
    pub lower_bound_growth: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyChange {
    pub growth: Vec<f64>,
    pub gdp_growth: Vec<f64>,
    pub upper_bound_growth: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub gdp_elasticity: Vec<f64>,
    pub stock_elasticity: Vec<f64>,
    pub area_elasticity: Vec<f64>,
}

/// Per-region forest drivers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForestChange {
    pub gdp_growth: Vec<f64>,
    pub stock_change: Vec<f64>,
    pub area_change: Vec<f64>,
    pub endogenous_adjustment: Vec<f64>,
    pub stock_elasticity_area: Vec<f64>,
    pub area_gdp_linear: Vec<f64>,
    pub area_gdp_square: Vec<f64>,
    pub fuelwood_fraction: Vec<f64>,
    pub inventory_drain: Vec<f64>,
    pub max_inventory_drain: Vec<f64>,
    pub co2_price_growth: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeChange {
    pub trade_inertia: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub freight_change: Vec<f64>,
    pub import_tax_change: Vec<f64>,
    pub export_tax_change: Vec<f64>,
}

/// One exogenous period block aligned onto the base index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExogenousBlock {
    pub period: u32,
    pub forecast_years: u32,
    pub demand: DemandChange,
    pub supply: SupplyChange,
    pub forest: ForestChange,
    pub manufacture_cost_growth: Vec<f64>,
    /// Additive yearly change per (region, input, output)
    pub coefficient_change: Vec<CoefficientRecord>,
    pub import: TradeChange,
    pub export: TradeChange,
}

fn zeros(len: usize) -> Vec<f64> {
    vec![0.0; len]
}

fn keep(len: usize) -> Vec<f64> {
    vec![KEEP_OR_SWITCH; len]
}

impl ExogenousBlock {
    /// Neutral block: every driver either keeps the current value or adds nothing.
    ///
    /// Records missing from the input are aligned to these values.
    pub fn neutral(cells: usize, regions: usize) -> Self {
        Self {
            period: 0,
            forecast_years: 0,
            demand: DemandChange {
                growth: zeros(cells),
                elasticity: zeros(cells),
                gdp_elasticity: zeros(cells),
                gdp_growth: zeros(cells),
                expected_growth: zeros(cells),
                lower_bound_growth: zeros(cells),
            },
            supply: SupplyChange {
                growth: zeros(cells),
                gdp_growth: zeros(cells),
                upper_bound_growth: keep(cells),
                elasticity: zeros(cells),
                gdp_elasticity: zeros(cells),
                stock_elasticity: zeros(cells),
                area_elasticity: zeros(cells),
            },
            forest: ForestChange {
                gdp_growth: zeros(regions),
                stock_change: keep(regions),
                area_change: keep(regions),
                endogenous_adjustment: zeros(regions),
                stock_elasticity_area: zeros(regions),
                area_gdp_linear: zeros(regions),
                area_gdp_square: zeros(regions),
                fuelwood_fraction: keep(regions),
                inventory_drain: keep(regions),
                max_inventory_drain: zeros(regions),
                co2_price_growth: zeros(regions),
            },
            manufacture_cost_growth: zeros(cells),
            coefficient_change: Vec::new(),
            import: TradeChange {
                trade_inertia: zeros(cells),
                elasticity: zeros(cells),
                freight_change: zeros(cells),
                import_tax_change: zeros(cells),
                export_tax_change: zeros(cells),
            },
            export: TradeChange {
                trade_inertia: zeros(cells),
                elasticity: zeros(cells),
                freight_change: zeros(cells),
                import_tax_change: zeros(cells),
                export_tax_change: zeros(cells),
            },
        }
    }

    pub fn align(index: &BaseIndex, period: &ExogenousPeriod) -> EngineResult<Self> {
        let mut block = Self::neutral(index.len(), index.region_count());
        block.period = period.period;
        block.forecast_years = period.forecast_years;

        for rec in &period.demand {
            let cell = index.locate(&rec.region, rec.commodity)?;
            let d = &mut block.demand;
            d.growth[cell] = rec.growth;
            d.elasticity[cell] = rec.elasticity;
            d.gdp_elasticity[cell] = rec.gdp_elasticity;
            d.gdp_growth[cell] = rec.gdp_growth;
            d.expected_growth[cell] = rec.expected_growth;
            d.lower_bound_growth[cell] = rec.lower_bound_growth;
        }
        for rec in &period.supply {
            let cell = index.locate(&rec.region, rec.commodity)?;
            let s = &mut block.supply;
            s.growth[cell] = rec.growth;
            s.gdp_growth[cell] = rec.gdp_growth;
            s.upper_bound_growth[cell] = rec.upper_bound_growth;
            s.elasticity[cell] = rec.elasticity;
            s.gdp_elasticity[cell] = rec.gdp_elasticity;
            s.stock_elasticity[cell] = rec.stock_elasticity;
            s.area_elasticity[cell] = rec.area_elasticity;
        }
        for rec in &period.forest {
            let r = index.locate_region(&rec.region)?;
            let f = &mut block.forest;
            f.gdp_growth[r] = rec.gdp_growth;
            f.stock_change[r] = rec.stock_change;
            f.area_change[r] = rec.area_change;
            f.endogenous_adjustment[r] = rec.endogenous_adjustment;
            f.stock_elasticity_area[r] = rec.stock_elasticity_area;
            f.area_gdp_linear[r] = rec.area_gdp_linear;
            f.area_gdp_square[r] = rec.area_gdp_square;
            f.fuelwood_fraction[r] = rec.fuelwood_fraction;
            f.inventory_drain[r] = rec.inventory_drain;
            f.max_inventory_drain[r] = rec.max_inventory_drain;
            f.co2_price_growth[r] = rec.co2_price_growth;
        }
        for rec in &period.manufacture_cost {
            let cell = index.locate(&rec.region, rec.commodity)?;
            block.manufacture_cost_growth[cell] = rec.cost_growth;
        }
        for rec in &period.manufacture_coefficients {
            index.locate(&rec.region, rec.input)?;
            index.locate(&rec.region, rec.output)?;
            block.coefficient_change.push(rec.clone());
        }
        for (records, target) in [(&period.import, &mut block.import), (&period.export, &mut block.export)] {
            for rec in records {
                let cell = index.locate(&rec.region, rec.commodity)?;
                target.trade_inertia[cell] = rec.trade_inertia;
                target.elasticity[cell] = rec.elasticity;
                target.freight_change[cell] = rec.freight_change;
                target.import_tax_change[cell] = rec.import_tax_change;
                target.export_tax_change[cell] = rec.export_tax_change;
            }
        }
        Ok(block)
    }
}
