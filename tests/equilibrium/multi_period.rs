use forest_trade_equilibrium::config::{Config, MaterialBalanceMode, ProductPriceMode};
use forest_trade_equilibrium::domain::{DomainKind, TradeRecord};
use forest_trade_equilibrium::orchestrator::GLOBAL_CONTINENT;
use forest_trade_equilibrium::Simulation;

use super::fixtures::{config, infeasible_follow_period_world, two_region_world, FUELWOOD, ROUNDWOOD};

fn calculated_prices(max_period: usize, capped: bool) -> Config {
    let mut cfg = config(max_period, MaterialBalanceMode::RegionCommodity);
    cfg.model.price_mode = ProductPriceMode::Calculated;
    cfg.model.capped_prices = capped;
    cfg
}

#[test]
fn test_run_reaches_horizon() {
    let mut simulation =
        Simulation::new(config(2, MaterialBalanceMode::Commodity), &two_region_world()).expect("aligns");
    let output = simulation.run();

    assert!(output.failure.is_none(), "{:?}", output.failure);
    assert_eq!(output.periods_completed, 3);
    let years: Vec<i32> = simulation.history().iter().map(|s| s.year()).collect();
    assert_eq!(years, vec![2020, 2025, 2030], "Each follow period advances by the block length");

    // constant world price policy
    let roundwood = simulation.world().index.commodity_position(ROUNDWOOD).expect("indexed");
    for state in simulation.history() {
        assert_eq!(state.result.world_price[roundwood], 55.0);
    }
}

#[test]
fn test_solver_failure_keeps_recorded_periods() {
    let mut simulation = Simulation::new(config(3, MaterialBalanceMode::RegionCommodity), &infeasible_follow_period_world())
        .expect("aligns");
    let output = simulation.run();

    let failure = output.failure.as_ref().expect("Period 1 must fail");
    assert_eq!(failure.period, 1);
    assert_eq!(output.periods_completed, 1, "Base period stays recorded");
    assert_eq!(simulation.history()[0].period(), 0);
    assert!(!output.results.is_empty(), "Output views are built from the recorded history");
}

#[test]
fn test_forest_and_manufacture_views_cover_every_period() {
    let mut simulation =
        Simulation::new(config(1, MaterialBalanceMode::RegionGroup), &two_region_world()).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);

    assert_eq!(output.forest.len(), 2 * 2, "Two real regions over two periods");
    assert_eq!(output.manufacture.len(), 2 * 3 * 2, "Real cells over two periods");
    let se_base = output
        .forest
        .iter()
        .find(|row| row.region == "se" && row.period == 0)
        .expect("forest row");
    let se_next = output
        .forest
        .iter()
        .find(|row| row.region == "se" && row.period == 1)
        .expect("forest row");
    assert!(se_next.stock < se_base.stock, "Harvest without growth drains the stock");
    assert!(se_next.supply_from_forest > 0.0);
}

#[test]
fn test_continent_view_adds_global_rows() {
    let mut simulation =
        Simulation::new(config(0, MaterialBalanceMode::Commodity), &two_region_world()).expect("aligns");
    let output = simulation.run();
    let rows = output.continents.expect("Every region carries a continent");

    let pick = |continent: &str| {
        rows.iter()
            .find(|r| r.continent == continent && r.commodity == ROUNDWOOD && r.domain == DomainKind::Supply)
            .map(|r| r.quantity)
            .expect("aggregate row")
    };
    // both regions are European, so the global row equals the continent row
    assert!((pick("Europe") - pick(GLOBAL_CONTINENT)).abs() < 1e-9);
    assert!(pick(GLOBAL_CONTINENT) > 0.0);
}

#[test]
fn test_continent_view_skipped_without_codes() {
    let mut input = two_region_world();
    input.regions[1].continent = None;
    let mut simulation = Simulation::new(config(0, MaterialBalanceMode::Commodity), &input).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none());
    assert!(output.continents.is_none(), "Aggregation needs a continent on every region");
}

#[test]
fn test_empty_import_lane_keeps_world_price() {
    let mut input = two_region_world();
    input.import.push(TradeRecord {
        region: "se".into(),
        commodity: FUELWOOD,
        quantity: 0.0,
        freight_cost: 5.0,
        trade_inertia: 0.1,
        elasticity: 0.5,
        ..Default::default()
    });
    let mut simulation = Simulation::new(calculated_prices(1, false), &input).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);
    assert_eq!(simulation.history().len(), 2);

    let lane = simulation.world().index.locate("se", FUELWOOD).expect("indexed");
    for state in simulation.history() {
        let period = state.period();
        assert!(
            (state.result.import.price[lane] - 30.0).abs() < 1e-9,
            "period {period}: an empty lane carries no transport cost, got {}",
            state.result.import.price[lane]
        );
        for kind in [DomainKind::Demand, DomainKind::Supply, DomainKind::Manufacture, DomainKind::Import] {
            for (cell, p) in state.result.domain(kind).price.iter().enumerate() {
                assert!(p.is_finite() && *p < 1e4, "period {period} {kind} cell {cell}: price {p}");
            }
        }
    }
}

#[test]
fn test_capped_supply_price_uses_current_import_price() {
    let mut simulation = Simulation::new(calculated_prices(2, true), &two_region_world()).expect("aligns");
    let output = simulation.run();
    assert!(output.failure.is_none(), "{:?}", output.failure);

    for state in simulation.history() {
        let result = &state.result;
        for (cell, (supply, import)) in result.supply.price.iter().zip(&result.import.price).enumerate() {
            assert!(
                *supply <= *import + 1e-9,
                "period {} cell {cell}: supply price {supply} above import price {import}",
                state.period()
            );
        }
    }
}
