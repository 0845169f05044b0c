//! Canonical region x commodity alignment of every input domain.

pub mod exogenous;
pub mod groups;
pub mod index;
pub mod io_matrix;
pub mod periods;

pub use exogenous::*;
pub use groups::*;
pub use index::*;
pub use io_matrix::*;
pub use periods::*;

use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    DefaultCoefficientRecord, DemandTable, ForestTable, ManufactureTable, Market, RecyclingTable,
    SupplyTable, TradeRecord, TradeTable, WorldInput,
};
use crate::error::{EngineError, EngineResult};

/// Run-invariant data: index, groups, schedule and exogenous drivers
#[derive(Debug, Clone)]
pub struct World {
    pub index: BaseIndex,
    pub groups: CommodityGroups,
    pub periods: PeriodTable,
    pub exogenous: Vec<ExogenousBlock>,
    /// World price per commodity at the base period
    pub base_world_price: Vec<f64>,
    /// External world price per year, aligned to commodity order
    pub world_price_series: BTreeMap<i32, Vec<f64>>,
    pub default_coefficients: Option<Vec<DefaultCoefficientRecord>>,
    pub base_year: i32,
}

impl World {
    /// Exogenous block for a period block number; neutral when none was declared
    pub fn exogenous_block(&self, block: usize) -> ExogenousBlock {
        self.exogenous
            .get(block)
            .cloned()
            .unwrap_or_else(|| ExogenousBlock::neutral(self.index.len(), self.index.region_count()))
    }

    pub fn io_matrix(&self, market: &Market) -> EngineResult<IoMatrix> {
        IoMatrix::build(&self.index, &market.coefficients, self.default_coefficients.as_deref())
    }
}

/// Align the raw input onto the base index
pub fn align(input: &WorldInput, config: &Config) -> EngineResult<(World, Market)> {
    let base_year = match input.base_year {
        Some(year) if year != config.model.base_year => {
            warn!(configured = config.model.base_year, input = year, "Base year differs from configuration, using input year");
            year
        }
        Some(year) => year,
        None => config.model.base_year,
    };

    let index = BaseIndex::new(&input.regions, &input.commodities)?;
    let market = align_market(&index, input)?;
    let groups = CommodityGroups::derive(&index, input);

    let mut declared: Vec<_> = input.exogenous.iter().collect();
    declared.sort_by_key(|p| p.period);
    let exogenous = declared
        .iter()
        .map(|p| ExogenousBlock::align(&index, p))
        .collect::<EngineResult<Vec<_>>>()?;
    let schedule: Vec<(u32, u32)> = declared.iter().map(|p| (p.period, p.forecast_years)).collect();
    let periods = PeriodTable::build(&schedule, base_year, config.model.max_period);

    let base_world_price = if input.world_prices.is_empty() {
        market.import.price[..index.commodity_count()].to_vec()
    } else {
        let mut prices = vec![0.0; index.commodity_count()];
        for rec in &input.world_prices {
            let c = index
                .commodity_position(rec.commodity)
                .ok_or_else(|| EngineError::data_shape(format!("world price for unknown commodity {}", rec.commodity)))?;
            prices[c] = rec.price;
        }
        prices
    };

    let mut world_price_series: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for rec in &input.world_price_series {
        let c = index
            .commodity_position(rec.commodity)
            .ok_or_else(|| EngineError::data_shape(format!("world price series for unknown commodity {}", rec.commodity)))?;
        world_price_series
            .entry(rec.year)
            .or_insert_with(|| vec![0.0; index.commodity_count()])[c] = rec.price;
    }

    let default_coefficients = config
        .io
        .use_default_io
        .then(|| input.default_coefficients.clone());

    info!(
        regions = index.region_count(),
        commodities = index.commodity_count(),
        cells = index.len(),
        exogenous_blocks = exogenous.len(),
        "Aligned world input"
    );

    let mut market = market;
    market.world_price = base_world_price.clone();

    Ok((
        World {
            index,
            groups,
            periods,
            exogenous,
            base_world_price,
            world_price_series,
            default_coefficients,
            base_year,
        },
        market,
    ))
}

fn claim(seen: &mut HashSet<(usize, &'static str)>, cell: usize, domain: &'static str) -> EngineResult<()> {
    if seen.insert((cell, domain)) {
        Ok(())
    } else {
        Err(EngineError::data_shape(format!("duplicate {domain} record for cell {cell}")))
    }
}

fn align_market(index: &BaseIndex, input: &WorldInput) -> EngineResult<Market> {
    let len = index.len();
    let mut seen = HashSet::new();

    let mut demand = DemandTable::zeros(len);
    for rec in &input.demand {
        let cell = index.locate(&rec.region, rec.commodity)?;
        claim(&mut seen, cell, "demand")?;
        demand.price[cell] = rec.price;
        demand.quantity[cell] = rec.quantity;
        demand.elasticity[cell] = rec.elasticity;
        demand.gdp_elasticity[cell] = rec.gdp_elasticity;
        demand.expectations[cell] = rec.expectations;
        demand.lower_bound[cell] = rec.lower_bound;
        demand.upper_bound[cell] = rec.upper_bound;
    }

    let mut supply = SupplyTable::zeros(len);
    for rec in &input.supply {
        let cell = index.locate(&rec.region, rec.commodity)?;
        claim(&mut seen, cell, "supply")?;
        supply.price[cell] = rec.price;
        supply.quantity[cell] = rec.quantity;
        supply.elasticity[cell] = rec.elasticity;
        supply.gdp_elasticity[cell] = rec.gdp_elasticity;
        supply.stock_elasticity[cell] = rec.stock_elasticity;
        supply.area_elasticity[cell] = rec.area_elasticity;
        supply.lower_bound[cell] = rec.lower_bound;
        supply.upper_bound[cell] = rec.upper_bound;
    }

    let mut manufacture = ManufactureTable::zeros(len);
    for rec in &input.manufacture_cost {
        let cell = index.locate(&rec.region, rec.commodity)?;
        claim(&mut seen, cell, "manufacture cost")?;
        manufacture.cost[cell] = rec.cost;
        manufacture.price[cell] = rec.cost;
        manufacture.quantity[cell] = rec.quantity;
        manufacture.elasticity[cell] = rec.elasticity;
    }

    let import = align_trade(index, &input.import, &mut seen, "import")?;
    let export = align_trade(index, &input.export, &mut seen, "export")?;

    let mut forest = ForestTable::zeros(index.region_count());
    let mut seen_regions = HashSet::new();
    for rec in &input.forest {
        let r = index.locate_region(&rec.region)?;
        if !seen_regions.insert(r) {
            return Err(EngineError::data_shape(format!("duplicate forest record for region '{}'", rec.region)));
        }
        forest.gdp_per_capita[r] = rec.gdp_per_capita;
        forest.stock[r] = rec.stock;
        forest.stock_growth[r] = rec.stock_growth;
        forest.stock_elasticity_area[r] = rec.stock_elasticity_area;
        forest.area[r] = rec.area;
        forest.area_growth[r] = rec.area_growth;
        forest.area_gdp_linear[r] = rec.area_gdp_linear;
        forest.area_gdp_square[r] = rec.area_gdp_square;
        forest.fuelwood_fraction[r] = rec.fuelwood_fraction;
        forest.inventory_drain[r] = rec.inventory_drain;
        forest.max_inventory_drain[r] = rec.max_inventory_drain;
        forest.wood_co2[r] = rec.wood_co2;
        forest.co2_price[r] = rec.co2_price;
    }

    let mut recycling = RecyclingTable::zeros(len);
    for rec in &input.recycling {
        let cell = index.locate(&rec.region, rec.commodity)?;
        claim(&mut seen, cell, "recycling")?;
        recycling.recovery_lower[cell] = rec.recovery_lower;
        recycling.recovery_upper[cell] = rec.recovery_upper;
    }

    for rec in &input.manufacture_coefficients {
        index.locate(&rec.region, rec.input)?;
        index.locate(&rec.region, rec.output)?;
    }

    Ok(Market {
        demand,
        supply,
        import,
        export,
        manufacture,
        forest,
        recycling,
        coefficients: input.manufacture_coefficients.clone(),
        world_price: Vec::new(),
    })
}

fn align_trade(
    index: &BaseIndex,
    records: &[TradeRecord],
    seen: &mut HashSet<(usize, &'static str)>,
    domain: &'static str,
) -> EngineResult<TradeTable> {
    let mut table = TradeTable::zeros(index.len());
    for rec in records {
        let cell = index.locate(&rec.region, rec.commodity)?;
        claim(seen, cell, domain)?;
        table.price[cell] = rec.price;
        table.quantity[cell] = rec.quantity;
        table.elasticity[cell] = rec.elasticity;
        table.trade_inertia[cell] = rec.trade_inertia;
        table.freight_cost[cell] = rec.freight_cost;
        table.import_tax_rate[cell] = rec.import_tax;
        table.export_tax_rate[cell] = rec.export_tax;
        table.gdp_elasticity_exporter[cell] = rec.gdp_elasticity_exporter;
        table.gdp_elasticity_importer[cell] = rec.gdp_elasticity_importer;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CoefficientRecord, Commodity, CommodityGroup, DemandRecord, ExogenousPeriod, ManufactureCostRecord,
        Region, SupplyRecord,
    };

    fn input() -> WorldInput {
        let region = |code: &str| Region { code: code.into(), name: code.to_uppercase(), continent: None };
        WorldInput {
            base_year: Some(2017),
            regions: vec![region("de"), region("fi")],
            commodities: vec![
                Commodity { code: 80, name: "Fuelwood".into() },
                Commodity { code: 81, name: "Other industrial roundwood".into() },
                Commodity { code: 78, name: "Industrial roundwood".into() },
                Commodity { code: 84, name: "Sawnwood".into() },
            ],
            demand: vec![
                DemandRecord { region: "de".into(), commodity: 84, quantity: 10.0, price: 200.0, ..Default::default() },
                DemandRecord { region: "de".into(), commodity: 80, quantity: 3.0, price: 30.0, ..Default::default() },
            ],
            supply: vec![
                SupplyRecord { region: "fi".into(), commodity: 78, quantity: 20.0, price: 50.0, ..Default::default() },
                SupplyRecord { region: "fi".into(), commodity: 80, quantity: 3.0, price: 20.0, ..Default::default() },
                SupplyRecord { region: "fi".into(), commodity: 81, quantity: 1.0, price: 20.0, ..Default::default() },
            ],
            manufacture_cost: vec![ManufactureCostRecord {
                region: "fi".into(),
                commodity: 84,
                cost: 40.0,
                quantity: 10.0,
                elasticity: 0.5,
            }],
            manufacture_coefficients: vec![CoefficientRecord {
                region: "fi".into(),
                input: 78,
                output: 84,
                coefficient: 2.0,
            }],
            export: vec![TradeRecord { region: "fi".into(), commodity: 80, quantity: 1.0, ..Default::default() }],
            exogenous: vec![
                ExogenousPeriod { period: 2, forecast_years: 5, ..Default::default() },
                ExogenousPeriod { period: 1, forecast_years: 5, ..Default::default() },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_input_base_year_wins() {
        let (world, _) = align(&input(), &Config::default()).unwrap();
        assert_eq!(world.base_year, 2017, "Input base year should override configuration");
        assert_eq!(world.periods.get(1).map(|p| p.year), Some(2022));
    }

    #[test]
    fn test_missing_cells_are_zero_filled() {
        let (world, market) = align(&input(), &Config::default()).unwrap();
        assert_eq!(market.demand.quantity.len(), world.index.len());
        let cell = world.index.locate("fi", 84).unwrap();
        assert_eq!(market.demand.quantity[cell], 0.0);
        assert_eq!(market.manufacture.cost[cell], 40.0);
        assert_eq!(market.forest.stock.len(), world.index.region_count());
    }

    #[test]
    fn test_groups_derived_from_data() {
        let (world, _) = align(&input(), &Config::default()).unwrap();
        let groups = &world.groups;
        assert_eq!(groups.group_of(0), Some(CommodityGroup::Fuelwood));
        assert_eq!(groups.group_of(1), Some(CommodityGroup::OtherRoundwood));
        assert_eq!(groups.group_of(2), Some(CommodityGroup::Raw));
        assert_eq!(groups.group_of(3), Some(CommodityGroup::Final));
        assert!(groups.forest_raw.contains(&2) && groups.forest_raw.contains(&1), "Roundwood is harvested from forest");
    }

    #[test]
    fn test_exogenous_blocks_sorted_by_period() {
        let (world, _) = align(&input(), &Config::default()).unwrap();
        let periods: Vec<u32> = world.exogenous.iter().map(|b| b.period).collect();
        assert_eq!(periods, vec![1, 2]);
    }

    #[test]
    fn test_duplicate_record_rejected() {
        let mut raw = input();
        raw.demand.push(raw.demand[0].clone());
        assert!(matches!(align(&raw, &Config::default()), Err(EngineError::DataShape(_))));
    }

    #[test]
    fn test_unknown_coefficient_code_rejected() {
        let mut raw = input();
        raw.manufacture_coefficients[0].input = 999;
        assert!(align(&raw, &Config::default()).is_err(), "Unknown IO input code must fail alignment");
    }
}
