//! Sparse input records as delivered by the data loader.
//!
//! Every record is keyed by region and commodity codes. Missing numeric
//! columns default to zero; missing records are filled with zeros during
//! alignment, exogenous change records with their neutral values.

use serde::{Deserialize, Serialize};

use super::{Commodity, Region};
use crate::dynamization::KEEP_OR_SWITCH;

/// Complete world input for one simulation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldInput {
    /// Base year declared by the input; overrides the configured year
    pub base_year: Option<i32>,
    pub regions: Vec<Region>,
    pub commodities: Vec<Commodity>,
    pub demand: Vec<DemandRecord>,
    pub supply: Vec<SupplyRecord>,
    pub forest: Vec<ForestRecord>,
    pub manufacture_cost: Vec<ManufactureCostRecord>,
    pub manufacture_coefficients: Vec<CoefficientRecord>,
    /// Fallback coefficients per (input, output) for regions lacking their own
    pub default_coefficients: Vec<DefaultCoefficientRecord>,
    pub import: Vec<TradeRecord>,
    pub export: Vec<TradeRecord>,
    pub recycling: Vec<RecyclingRecord>,
    /// Base period world price per commodity
    pub world_prices: Vec<WorldPriceRecord>,
    /// External world price series used by the exogenous world price mode
    pub world_price_series: Vec<WorldPriceSeriesRecord>,
    pub exogenous: Vec<ExogenousPeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandRecord {
    pub region: String,
    pub commodity: u32,
    pub price: f64,
    pub quantity: f64,
    pub elasticity: f64,
    pub gdp_elasticity: f64,
    /// Elasticity on expected demand growth
    pub expectations: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyRecord {
    pub region: String,
    pub commodity: u32,
    pub price: f64,
    pub quantity: f64,
    pub elasticity: f64,
    pub gdp_elasticity: f64,
    pub stock_elasticity: f64,
    pub area_elasticity: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Forest state per region
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestRecord {
    pub region: String,
    pub gdp_per_capita: f64,
    pub stock: f64,
    pub stock_growth: f64,
    pub stock_elasticity_area: f64,
    pub area: f64,
    pub area_growth: f64,
    /// Linear GDP term of the area growth model
    pub area_gdp_linear: f64,
    /// Exponential GDP term of the area growth model
    pub area_gdp_square: f64,
    /// Share of fuelwood harvest drawn from forest stock
    pub fuelwood_fraction: f64,
    pub inventory_drain: f64,
    pub max_inventory_drain: f64,
    pub wood_co2: f64,
    pub co2_price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManufactureCostRecord {
    pub region: String,
    pub commodity: u32,
    pub cost: f64,
    pub quantity: f64,
    pub elasticity: f64,
}

/// Units of `input` needed per unit of `output` in a region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoefficientRecord {
    pub region: String,
    pub input: u32,
    pub output: u32,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCoefficientRecord {
    pub input: u32,
    pub output: u32,
    pub coefficient: f64,
}

/// Net trade per region and commodity (import or export side)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeRecord {
    pub region: String,
    pub commodity: u32,
    pub freight_cost: f64,
    pub import_tax: f64,
    pub export_tax: f64,
    pub quantity: f64,
    pub gdp_elasticity_exporter: f64,
    pub gdp_elasticity_importer: f64,
    pub trade_inertia: f64,
    /// Price in the country of origin
    pub price: f64,
    pub elasticity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecyclingRecord {
    pub region: String,
    pub commodity: u32,
    pub recovery_lower: f64,
    pub recovery_upper: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldPriceRecord {
    pub commodity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldPriceSeriesRecord {
    pub commodity: u32,
    pub year: i32,
    pub price: f64,
}

// ============================================================================
// Exogenous Change
// ============================================================================

/// Exogenous drivers for one declared period block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExogenousPeriod {
    pub period: u32,
    pub forecast_years: u32,
    pub demand: Vec<DemandChangeRecord>,
    pub supply: Vec<SupplyChangeRecord>,
    pub forest: Vec<ForestChangeRecord>,
    pub manufacture_cost: Vec<ManufactureCostChangeRecord>,
    pub manufacture_coefficients: Vec<CoefficientRecord>,
    pub import: Vec<TradeChangeRecord>,
    pub export: Vec<TradeChangeRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandChangeRecord {
    pub region: String,
    pub commodity: u32,
    /// Trend growth rate per year
    pub growth: f64,
    pub elasticity: f64,
    pub gdp_elasticity: f64,
    pub gdp_growth: f64,
    pub expected_growth: f64,
    pub lower_bound_growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyChangeRecord {
    pub region: String,
    pub commodity: u32,
    pub growth: f64,
    pub gdp_growth: f64,
    pub upper_bound_growth: f64,
    pub elasticity: f64,
    pub gdp_elasticity: f64,
    pub stock_elasticity: f64,
    pub area_elasticity: f64,
}

/// Rates of -1 defer to the endogenous forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestChangeRecord {
    pub region: String,
    pub gdp_growth: f64,
    pub stock_change: f64,
    pub area_change: f64,
    pub endogenous_adjustment: f64,
    pub stock_elasticity_area: f64,
    pub area_gdp_linear: f64,
    pub area_gdp_square: f64,
    pub fuelwood_fraction: f64,
    pub inventory_drain: f64,
    pub max_inventory_drain: f64,
    pub co2_price_growth: f64,
}

impl Default for SupplyChangeRecord {
    fn default() -> Self {
        Self {
            region: String::new(),
            commodity: 0,
            growth: 0.0,
            gdp_growth: 0.0,
            upper_bound_growth: KEEP_OR_SWITCH,
            elasticity: 0.0,
            gdp_elasticity: 0.0,
            stock_elasticity: 0.0,
            area_elasticity: 0.0,
        }
    }
}

impl Default for ForestChangeRecord {
    fn default() -> Self {
        Self {
            region: String::new(),
            gdp_growth: 0.0,
            stock_change: KEEP_OR_SWITCH,
            area_change: KEEP_OR_SWITCH,
            endogenous_adjustment: 0.0,
            stock_elasticity_area: 0.0,
            area_gdp_linear: 0.0,
            area_gdp_square: 0.0,
            fuelwood_fraction: KEEP_OR_SWITCH,
            inventory_drain: KEEP_OR_SWITCH,
            max_inventory_drain: 0.0,
            co2_price_growth: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManufactureCostChangeRecord {
    pub region: String,
    pub commodity: u32,
    pub cost_growth: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeChangeRecord {
    pub region: String,
    pub commodity: u32,
    pub trade_inertia: f64,
    pub elasticity: f64,
    pub freight_change: f64,
    pub import_tax_change: f64,
    pub export_tax_change: f64,
}
