//! Dense, base-index aligned domain tables.
//!
//! Every vector is indexed by base index cell (`region * commodities + commodity`)
//! except the forest table, which is indexed by region.

use serde::{Deserialize, Serialize};

use super::{CoefficientRecord, DomainKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandTable {
    pub price: Vec<f64>,
    pub quantity: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub gdp_elasticity: Vec<f64>,
    pub expectations: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
}

impl DemandTable {
    pub fn zeros(len: usize) -> Self {
        Self {
            price: vec![0.0; len],
            quantity: vec![0.0; len],
            elasticity: vec![0.0; len],
            gdp_elasticity: vec![0.0; len],
            expectations: vec![0.0; len],
            lower_bound: vec![0.0; len],
            upper_bound: vec![0.0; len],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyTable {
    pub price: Vec<f64>,
    pub quantity: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub gdp_elasticity: Vec<f64>,
    pub stock_elasticity: Vec<f64>,
    pub area_elasticity: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
    /// Periodic growth rate of the upper bound, set by dynamization
    pub upper_bound_growth: Vec<f64>,
}

impl SupplyTable {
    pub fn zeros(len: usize) -> Self {
        Self {
            price: vec![0.0; len],
            quantity: vec![0.0; len],
            elasticity: vec![0.0; len],
            gdp_elasticity: vec![0.0; len],
            stock_elasticity: vec![0.0; len],
            area_elasticity: vec![0.0; len],
            lower_bound: vec![0.0; len],
            upper_bound: vec![0.0; len],
            upper_bound_growth: vec![0.0; len],
        }
    }
}

/// One side of net trade (import or export)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeTable {
    pub price: Vec<f64>,
    pub quantity: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub trade_inertia: Vec<f64>,
    pub freight_cost: Vec<f64>,
    /// Ad valorem tax rates
    pub import_tax_rate: Vec<f64>,
    pub export_tax_rate: Vec<f64>,
    pub gdp_elasticity_exporter: Vec<f64>,
    pub gdp_elasticity_importer: Vec<f64>,
    /// Freight plus taxes, refreshed by the pricing step
    pub transport_cost: Vec<f64>,
}

impl TradeTable {
    pub fn zeros(len: usize) -> Self {
        Self {
            price: vec![0.0; len],
            quantity: vec![0.0; len],
            elasticity: vec![0.0; len],
            trade_inertia: vec![0.0; len],
            freight_cost: vec![0.0; len],
            import_tax_rate: vec![0.0; len],
            export_tax_rate: vec![0.0; len],
            gdp_elasticity_exporter: vec![0.0; len],
            gdp_elasticity_importer: vec![0.0; len],
            transport_cost: vec![0.0; len],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManufactureTable {
    /// Price of the manufacturing domain; reset to `cost` before calibration
    pub price: Vec<f64>,
    /// Net manufacturing cost
    pub cost: Vec<f64>,
    pub quantity: Vec<f64>,
    pub elasticity: Vec<f64>,
    pub raw_material_cost: Vec<f64>,
    pub total_production_cost: Vec<f64>,
}

impl ManufactureTable {
    pub fn zeros(len: usize) -> Self {
        Self {
            price: vec![0.0; len],
            cost: vec![0.0; len],
            quantity: vec![0.0; len],
            elasticity: vec![0.0; len],
            raw_material_cost: vec![0.0; len],
            total_production_cost: vec![0.0; len],
        }
    }
}

/// Forest state, one entry per region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForestTable {
    pub gdp_per_capita: Vec<f64>,
    pub stock: Vec<f64>,
    pub stock_growth: Vec<f64>,
    pub stock_elasticity_area: Vec<f64>,
    pub area: Vec<f64>,
    pub area_growth: Vec<f64>,
    pub area_gdp_linear: Vec<f64>,
    pub area_gdp_square: Vec<f64>,
    pub fuelwood_fraction: Vec<f64>,
    pub inventory_drain: Vec<f64>,
    pub max_inventory_drain: Vec<f64>,
    pub wood_co2: Vec<f64>,
    pub co2_price: Vec<f64>,
    /// Calibrated area growth constant
    pub alpha: Vec<f64>,
    /// Calibrated stock growth constant
    pub gamma: Vec<f64>,
    /// Periodic area growth rate of the last dynamization
    pub area_rate: Vec<f64>,
    /// Periodic stock growth rate without harvest of the last dynamization
    pub stock_rate: Vec<f64>,
    /// Roundwood harvested from forest stock in the last dynamization
    pub supply_from_forest: Vec<f64>,
}

impl ForestTable {
    pub fn zeros(regions: usize) -> Self {
        let z = || vec![0.0; regions];
        Self {
            gdp_per_capita: z(),
            stock: z(),
            stock_growth: z(),
            stock_elasticity_area: z(),
            area: z(),
            area_growth: z(),
            area_gdp_linear: z(),
            area_gdp_square: z(),
            fuelwood_fraction: z(),
            inventory_drain: z(),
            max_inventory_drain: z(),
            wood_co2: z(),
            co2_price: z(),
            alpha: z(),
            gamma: z(),
            area_rate: z(),
            stock_rate: z(),
            supply_from_forest: z(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecyclingTable {
    pub recovery_lower: Vec<f64>,
    /// Share of paper consumption recoverable as wastepaper
    pub recovery_upper: Vec<f64>,
}

impl RecyclingTable {
    pub fn zeros(len: usize) -> Self {
        Self {
            recovery_lower: vec![0.0; len],
            recovery_upper: vec![0.0; len],
        }
    }
}

/// Mutable market state: every aligned domain for the current period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub demand: DemandTable,
    pub supply: SupplyTable,
    pub import: TradeTable,
    pub export: TradeTable,
    pub manufacture: ManufactureTable,
    pub forest: ForestTable,
    pub recycling: RecyclingTable,
    /// Coefficients in effect, one entry per (region, input, output)
    pub coefficients: Vec<CoefficientRecord>,
    /// World price per commodity entering the current period
    pub world_price: Vec<f64>,
}

impl Market {
    pub fn price(&self, kind: DomainKind) -> &[f64] {
        match kind {
            DomainKind::Demand => &self.demand.price,
            DomainKind::Export => &self.export.price,
            DomainKind::Import => &self.import.price,
            DomainKind::Manufacture => &self.manufacture.price,
            DomainKind::Supply => &self.supply.price,
        }
    }

    pub fn quantity(&self, kind: DomainKind) -> &[f64] {
        match kind {
            DomainKind::Demand => &self.demand.quantity,
            DomainKind::Export => &self.export.quantity,
            DomainKind::Import => &self.import.quantity,
            DomainKind::Manufacture => &self.manufacture.quantity,
            DomainKind::Supply => &self.supply.quantity,
        }
    }

    pub fn elasticity(&self, kind: DomainKind) -> &[f64] {
        match kind {
            DomainKind::Demand => &self.demand.elasticity,
            DomainKind::Export => &self.export.elasticity,
            DomainKind::Import => &self.import.elasticity,
            DomainKind::Manufacture => &self.manufacture.elasticity,
            DomainKind::Supply => &self.supply.elasticity,
        }
    }

    pub fn quantity_mut(&mut self, kind: DomainKind) -> &mut Vec<f64> {
        match kind {
            DomainKind::Demand => &mut self.demand.quantity,
            DomainKind::Export => &mut self.export.quantity,
            DomainKind::Import => &mut self.import.quantity,
            DomainKind::Manufacture => &mut self.manufacture.quantity,
            DomainKind::Supply => &mut self.supply.quantity,
        }
    }

    pub fn price_mut(&mut self, kind: DomainKind) -> &mut Vec<f64> {
        match kind {
            DomainKind::Demand => &mut self.demand.price,
            DomainKind::Export => &mut self.export.price,
            DomainKind::Import => &mut self.import.price,
            DomainKind::Manufacture => &mut self.manufacture.price,
            DomainKind::Supply => &mut self.supply.price,
        }
    }
}
