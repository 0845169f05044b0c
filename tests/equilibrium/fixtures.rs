//! Hand-built worlds with consistent base-period balances.
//!
//! Two real regions trade roundwood and sawnwood; both burn their own
//! fuelwood. Base quantities close every material balance exactly.

use forest_trade_equilibrium::config::{Config, MaterialBalanceMode, WorldPriceMode};
use forest_trade_equilibrium::domain::{
    CoefficientRecord, Commodity, DemandChangeRecord, DemandRecord, ExogenousPeriod, ForestRecord,
    ManufactureCostRecord, Region, SupplyRecord, TradeRecord, WorldInput, WorldPriceRecord,
};

pub const FUELWOOD: u32 = 80;
pub const ROUNDWOOD: u32 = 81;
pub const SAWNWOOD: u32 = 85;

pub fn config(max_period: usize, mode: MaterialBalanceMode) -> Config {
    let mut config = Config::default();
    config.model.max_period = max_period;
    config.model.material_balance = mode;
    config.model.world_price_mode = WorldPriceMode::Constant;
    config.model.verbose = false;
    config
}

fn region(code: &str, name: &str, continent: &str) -> Region {
    Region {
        code: code.into(),
        name: name.into(),
        continent: Some(continent.into()),
    }
}

fn demand(region: &str, commodity: u32, price: f64, quantity: f64) -> DemandRecord {
    DemandRecord {
        region: region.into(),
        commodity,
        price,
        quantity,
        elasticity: -0.5,
        ..Default::default()
    }
}

fn supply(region: &str, commodity: u32, price: f64, quantity: f64) -> SupplyRecord {
    SupplyRecord {
        region: region.into(),
        commodity,
        price,
        quantity,
        elasticity: 0.8,
        ..Default::default()
    }
}

fn forest(region: &str, stock: f64) -> ForestRecord {
    ForestRecord {
        region: region.into(),
        gdp_per_capita: 30_000.0,
        stock,
        area: stock / 100.0,
        fuelwood_fraction: 1.0,
        inventory_drain: 1.0,
        ..Default::default()
    }
}

fn trade(region: &str, commodity: u32, quantity: f64) -> TradeRecord {
    TradeRecord {
        region: region.into(),
        commodity,
        quantity,
        freight_cost: 5.0,
        trade_inertia: 0.1,
        ..Default::default()
    }
}

/// Region "se" exports roundwood and sawnwood to region "it".
///
/// se: roundwood 100 = 2 x 40 manufactured + 20 exported;
///     sawnwood 40 manufactured = 30 demand + 10 exported.
/// it: roundwood 60 supplied + 20 imported = 2 x 40 manufactured;
///     sawnwood 40 manufactured + 10 imported = 50 demand.
pub fn two_region_world() -> WorldInput {
    let coefficient = |region: &str| CoefficientRecord {
        region: region.into(),
        input: ROUNDWOOD,
        output: SAWNWOOD,
        coefficient: 2.0,
    };
    let manufacture = |region: &str| ManufactureCostRecord {
        region: region.into(),
        commodity: SAWNWOOD,
        cost: 60.0,
        quantity: 40.0,
        elasticity: 0.5,
    };

    WorldInput {
        base_year: Some(2020),
        regions: vec![region("se", "Sweden", "Europe"), region("it", "Italy", "Europe")],
        commodities: vec![
            Commodity { code: FUELWOOD, name: "Fuelwood".into() },
            Commodity { code: ROUNDWOOD, name: "Industrial roundwood".into() },
            Commodity { code: SAWNWOOD, name: "Sawnwood".into() },
        ],
        demand: vec![
            demand("se", FUELWOOD, 30.0, 50.0),
            demand("se", SAWNWOOD, 200.0, 30.0),
            demand("it", FUELWOOD, 30.0, 30.0),
            demand("it", SAWNWOOD, 210.0, 50.0),
        ],
        supply: vec![
            supply("se", FUELWOOD, 30.0, 50.0),
            supply("se", ROUNDWOOD, 50.0, 100.0),
            supply("it", FUELWOOD, 30.0, 30.0),
            supply("it", ROUNDWOOD, 55.0, 60.0),
        ],
        forest: vec![forest("se", 30_000.0), forest("it", 10_000.0)],
        manufacture_cost: vec![manufacture("se"), manufacture("it")],
        manufacture_coefficients: vec![coefficient("se"), coefficient("it")],
        export: vec![
            trade("se", ROUNDWOOD, 20.0),
            trade("se", SAWNWOOD, 10.0),
            trade("se", FUELWOOD, 0.0),
            trade("it", ROUNDWOOD, 0.0),
            trade("it", SAWNWOOD, 0.0),
            trade("it", FUELWOOD, 0.0),
        ],
        import: vec![
            trade("it", ROUNDWOOD, 20.0),
            trade("it", SAWNWOOD, 10.0),
        ],
        world_prices: vec![
            WorldPriceRecord { commodity: FUELWOOD, price: 30.0 },
            WorldPriceRecord { commodity: ROUNDWOOD, price: 55.0 },
            WorldPriceRecord { commodity: SAWNWOOD, price: 205.0 },
        ],
        exogenous: vec![ExogenousPeriod {
            period: 1,
            forecast_years: 5,
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// Single region burning its own fuelwood, nothing traded
pub fn fuelwood_world(stock: f64) -> WorldInput {
    WorldInput {
        base_year: Some(2020),
        regions: vec![region("at", "Austria", "Europe")],
        commodities: vec![Commodity { code: FUELWOOD, name: "Fuelwood".into() }],
        demand: vec![demand("at", FUELWOOD, 40.0, 80.0)],
        supply: vec![supply("at", FUELWOOD, 40.0, 80.0)],
        forest: vec![forest("at", stock)],
        export: vec![trade("at", FUELWOOD, 0.0)],
        world_prices: vec![WorldPriceRecord { commodity: FUELWOOD, price: 40.0 }],
        ..Default::default()
    }
}

/// Region "a" grows all fuelwood, region "b" burns all of it; freight is free.
///
/// Curves cross at quantity 60 and price 40. Other roundwood is used where it
/// grows, crossing at quantity 10 and price 20.
pub fn sole_producer_world() -> WorldInput {
    let free = |region: &str, quantity: f64| TradeRecord {
        freight_cost: 0.0,
        ..trade(region, FUELWOOD, quantity)
    };
    WorldInput {
        base_year: Some(2020),
        regions: vec![region("a", "Producer", "Europe"), region("b", "Consumer", "Europe")],
        commodities: vec![
            Commodity { code: FUELWOOD, name: "Fuelwood".into() },
            Commodity { code: ROUNDWOOD, name: "Other industrial roundwood".into() },
        ],
        demand: vec![demand("b", FUELWOOD, 40.0, 60.0), demand("a", ROUNDWOOD, 20.0, 10.0)],
        supply: vec![supply("a", FUELWOOD, 40.0, 60.0), supply("a", ROUNDWOOD, 20.0, 10.0)],
        forest: vec![forest("a", 10_000.0), forest("b", 0.0)],
        export: vec![free("a", 60.0), free("b", 0.0)],
        import: vec![free("a", 0.0), free("b", 60.0)],
        world_prices: vec![
            WorldPriceRecord { commodity: FUELWOOD, price: 40.0 },
            WorldPriceRecord { commodity: ROUNDWOOD, price: 20.0 },
        ],
        ..Default::default()
    }
}

/// Two-region world whose demand floor outgrows demand in the first follow period
pub fn infeasible_follow_period_world() -> WorldInput {
    let mut input = two_region_world();
    for rec in input.demand.iter_mut().filter(|d| d.commodity == FUELWOOD) {
        rec.lower_bound = 10.0;
    }
    input.exogenous[0].demand = vec![DemandChangeRecord {
        region: "se".into(),
        commodity: FUELWOOD,
        lower_bound_growth: 1.0,
        ..Default::default()
    }];
    input
}

/// Largest absolute element, at least one
pub fn scale(values: &[f64]) -> f64 {
    values.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()))
}
