use rstest::rstest;

use forest_trade_equilibrium::config::{MaterialBalanceMode, WorldPriceMode};
use forest_trade_equilibrium::domain::DomainKind;
use forest_trade_equilibrium::{EngineError, Simulation};

use super::fixtures::{
    config, fuelwood_world, scale, sole_producer_world, two_region_world, FUELWOOD, ROUNDWOOD, SAWNWOOD,
};

fn solve_base(mode: MaterialBalanceMode) -> Simulation {
    let mut simulation = Simulation::new(config(0, mode), &two_region_world()).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "Base period should solve: {:?}", output.failure);
    assert_eq!(simulation.history().len(), 1);
    simulation
}

#[test]
fn test_base_period_closes_global_trade() {
    let simulation = solve_base(MaterialBalanceMode::RegionCommodity);
    let state = &simulation.history()[0];
    let index = &simulation.world().index;
    let market = &state.market;

    for c in 0..index.commodity_count() {
        let net: f64 = (0..index.region_count())
            .map(|r| {
                let cell = index.cell(r, c);
                market.import.quantity[cell] - market.export.quantity[cell]
            })
            .sum();
        let tolerance = 1e-4 * scale(&market.export.quantity);
        assert!(net.abs() < tolerance, "commodity {c}: imports minus exports = {net}");
    }
    assert!(
        state.result.verification.trade_balance_violations == 0,
        "Verification should agree: {:?}",
        state.result.verification
    );
}

#[test]
fn test_base_period_respects_bounds() {
    let simulation = solve_base(MaterialBalanceMode::Commodity);
    let state = &simulation.history()[0];
    for kind in DomainKind::all() {
        let quantity = &state.result.domain(kind).optimized;
        let lower = state.bounds.lower(kind);
        let upper = state.bounds.upper(kind);
        let tolerance = 1e-5 * scale(upper.iter().copied().filter(|u| *u < 1e6).collect::<Vec<_>>().as_slice());
        for (cell, q) in quantity.iter().enumerate() {
            assert!(
                *q >= lower[cell] - tolerance && *q <= upper[cell] + tolerance,
                "{kind} cell {cell}: {q} outside [{}, {}]",
                lower[cell],
                upper[cell]
            );
        }
    }
}

#[test]
fn test_base_period_satisfies_material_balance() {
    let simulation = solve_base(MaterialBalanceMode::RegionGroup);
    let report = &simulation.history()[0].result.verification;
    assert_eq!(report.material_balance_violations, 0, "{report:?}");
    assert!(report.material_balance_max < 1e-3, "{report:?}");
}

#[rstest]
#[case(MaterialBalanceMode::RegionGroup)]
#[case(MaterialBalanceMode::Commodity)]
fn test_material_balance_modes_agree(#[case] mode: MaterialBalanceMode) {
    let reference = solve_base(MaterialBalanceMode::RegionCommodity);
    let other = solve_base(mode);
    let a = &reference.history()[0].result;
    let b = &other.history()[0].result;

    for kind in DomainKind::all() {
        let qa = &a.domain(kind).optimized;
        let qb = &b.domain(kind).optimized;
        let tolerance = 1e-3 * scale(qa);
        for (cell, (x, y)) in qa.iter().zip(qb).enumerate() {
            assert!((x - y).abs() < tolerance, "{mode} {kind} cell {cell}: {x} vs {y}");
        }
    }

    let index = &reference.world().index;
    let sawnwood = index.commodity_position(SAWNWOOD).expect("sawnwood indexed");
    let total = |result: &forest_trade_equilibrium::extraction::PeriodResult| -> f64 {
        index
            .commodity_cells(sawnwood)
            .map(|cell| result.manufacture.optimized[cell])
            .sum()
    };
    assert!((total(a) - total(b)).abs() < 1e-3 * total(a).max(1.0), "Manufactured totals must match");
}

#[test]
fn test_solving_twice_is_deterministic() {
    let first = solve_base(MaterialBalanceMode::Commodity);
    let second = solve_base(MaterialBalanceMode::Commodity);
    let a = &first.history()[0];
    let b = &second.history()[0];
    assert_eq!(a.result.demand.optimized, b.result.demand.optimized);
    assert_eq!(a.result.supply.optimized, b.result.supply.optimized);
    assert_eq!(a.market.demand.price, b.market.demand.price);
}

#[test]
fn test_calibrated_market_reproduces_base_equilibrium() {
    let mut simulation = Simulation::new(config(0, MaterialBalanceMode::RegionCommodity), &fuelwood_world(1_000.0))
        .expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);

    let state = &simulation.history()[0];
    // demand and supply curves cross at the observed price and quantity
    assert!((state.result.demand.optimized[0] - 80.0).abs() < 1e-2, "{:?}", state.result.demand);
    assert!((state.result.supply.optimized[0] - 80.0).abs() < 1e-2, "{:?}", state.result.supply);
    assert!((state.market.demand.price[0] - 40.0).abs() < 1e-2, "Shadow price should equal the observed price");
}

#[test]
fn test_sole_producer_and_consumer_closed_form() {
    let mut simulation =
        Simulation::new(config(0, MaterialBalanceMode::RegionCommodity), &sole_producer_world()).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);

    let index = &simulation.world().index;
    let state = &simulation.history()[0];
    let cell = |region: &str, commodity: u32| index.locate(region, commodity).expect("indexed");
    let (a_fuel, b_fuel, a_round) = (cell("a", FUELWOOD), cell("b", FUELWOOD), cell("a", ROUNDWOOD));

    assert!((state.result.supply.optimized[a_fuel] - 60.0).abs() < 1e-2, "{:?}", state.result.supply);
    assert!((state.result.demand.optimized[b_fuel] - 60.0).abs() < 1e-2, "{:?}", state.result.demand);
    assert!((state.result.export.optimized[a_fuel] - 60.0).abs() < 1e-2);
    assert!(state.result.supply.optimized[b_fuel] < 1e-4, "The consumer has no forest to harvest");
    assert!((state.result.supply.optimized[a_round] - 10.0).abs() < 1e-2);

    assert!((state.market.demand.price[b_fuel] - 40.0).abs() < 1e-2, "Consumer pays the crossing price");
    assert!((state.market.supply.price[a_fuel] - 40.0).abs() < 1e-2, "Producer receives the crossing price");
    assert!((state.market.supply.price[a_round] - 20.0).abs() < 1e-2);
}

#[test]
fn test_zero_forest_stock_allows_no_harvest() {
    let mut simulation =
        Simulation::new(config(0, MaterialBalanceMode::Commodity), &fuelwood_world(0.0)).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);

    let state = &simulation.history()[0];
    assert!(state.result.supply.optimized[0] < 1e-4, "No forest, no fuelwood: {:?}", state.result.supply);
    assert!(state.result.demand.optimized[0] < 1e-4, "Demand must follow supply");
}

#[test]
fn test_zero_inventory_drain_ignores_forest_stock() {
    let mut input = fuelwood_world(0.0);
    input.forest[0].inventory_drain = 0.0;
    let mut simulation = Simulation::new(config(0, MaterialBalanceMode::Commodity), &input).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);

    let state = &simulation.history()[0];
    assert!(
        (state.result.supply.optimized[0] - 80.0).abs() < 1e-2,
        "Harvest without drain is not limited by stock: {:?}",
        state.result.supply
    );
    assert!((state.result.demand.optimized[0] - 80.0).abs() < 1e-2, "{:?}", state.result.demand);
}

#[test]
fn test_average_world_price_fails_before_solving() {
    let mut cfg = config(2, MaterialBalanceMode::Commodity);
    cfg.model.world_price_mode = WorldPriceMode::Average;
    let result = Simulation::new(cfg, &two_region_world());
    assert!(
        matches!(result, Err(EngineError::UnsupportedWorldPriceMode(WorldPriceMode::Average))),
        "Average world price must be rejected up front"
    );
}

#[test]
fn test_exogenous_world_price_requires_every_year() {
    let mut cfg = config(1, MaterialBalanceMode::Commodity);
    cfg.model.world_price_mode = WorldPriceMode::Exogenous;
    let result = Simulation::new(cfg, &two_region_world());
    assert!(matches!(result, Err(EngineError::DataShape(_))), "Missing series years must be rejected");
}
