//! Transport cost, trade prices, production prices and forest growth constants.

use tracing::debug;

use crate::alignment::{BaseIndex, CommodityGroups, IoMatrix};
use crate::constants::{FOREST_EPSILON, NON_ZERO, UNIT_FACTOR};
use crate::domain::{ForestTable, Market, TradeTable};

/// Freight plus import tax on the landed value plus export tax on the export price
pub fn transport_cost(import: &TradeTable, export: &TradeTable) -> Vec<f64> {
    (0..import.freight_cost.len())
        .map(|i| {
            let freight = import.freight_cost[i];
            freight
                + import.import_tax_rate[i] * (freight + import.price[i])
                + import.export_tax_rate[i] * export.price[i]
        })
        .collect()
}

/// Set trade prices from a world price per commodity.
///
/// Importing cells pay world price plus transport cost, cells without imports
/// get no import price. Exports fetch the world price.
pub fn apply_world_price(index: &BaseIndex, market: &mut Market, world_price: &[f64]) {
    for cell in 0..index.len() {
        let wp = world_price[index.commodity_of(cell)];
        market.import.price[cell] = if market.import.quantity[cell] > NON_ZERO {
            wp + market.import.transport_cost[cell]
        } else {
            0.0
        };
        market.export.price[cell] = wp;
    }
}

/// Production cost of manufactured commodities.
///
/// Updates raw material and total production cost, caps the net manufacturing
/// cost at the import price when `capped` is set, and resets the manufacturing
/// price to the net cost for calibration.
pub fn production_price(
    index: &BaseIndex,
    groups: &CommodityGroups,
    io: &IoMatrix,
    market: &mut Market,
    capped: bool,
) {
    let len = index.len();
    let supply_price: Vec<f64> = (0..len)
        .map(|cell| {
            let c = index.commodity_of(cell);
            let own = market.supply.price[cell];
            if groups.raw.contains(&c) && own == 0.0 {
                market.import.price[cell]
            } else {
                own
            }
        })
        .collect();

    let intermediate_cost = io.input_cost(&supply_price);
    let import_fill: Vec<f64> = (0..len)
        .map(|cell| {
            let c = index.commodity_of(cell);
            if groups.intermediate.contains(&c) && intermediate_cost[cell] == 0.0 {
                market.import.price[cell]
            } else {
                0.0
            }
        })
        .collect();

    let composite: Vec<f64> = (0..len)
        .map(|cell| {
            intermediate_cost[cell] + import_fill[cell] + market.manufacture.cost[cell] + supply_price[cell]
        })
        .collect();
    let raw_material_cost = io.input_cost(&composite);

    let manufacture = &mut market.manufacture;
    let mut capped_cells = 0usize;
    for cell in 0..len {
        let total = raw_material_cost[cell] + manufacture.cost[cell];
        if capped {
            let delta = (market.import.price[cell] - total).min(0.0);
            if delta < 0.0 {
                capped_cells += 1;
            }
            manufacture.cost[cell] = (manufacture.cost[cell] + delta).max(0.0);
        }
        manufacture.raw_material_cost[cell] = raw_material_cost[cell];
        manufacture.total_production_cost[cell] = raw_material_cost[cell] + manufacture.cost[cell];
        manufacture.price[cell] = manufacture.cost[cell];
    }
    if capped {
        debug!(capped_cells, "Capped manufacturing cost at import price");
    }
}

/// Calibrate the area (alpha) and stock (gamma) growth constants
pub fn forest_growth_constants(forest: &mut ForestTable) {
    for r in 0..forest.stock.len() {
        let gdp = forest.gdp_per_capita[r] / UNIT_FACTOR;
        forest.alpha[r] = forest.area_growth[r] / (forest.area_gdp_square[r] * gdp).exp()
            - forest.area_gdp_linear[r] * gdp;
        let density = (forest.stock[r] + FOREST_EPSILON) / (forest.area[r] + FOREST_EPSILON);
        let gamma = forest.stock_growth[r] / density.powf(forest.stock_elasticity_area[r]);
        forest.gamma[r] = if gamma.is_finite() { gamma } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoefficientRecord, Commodity, Region};

    fn index() -> BaseIndex {
        BaseIndex::new(
            &[Region { code: "at".into(), name: "Austria".into(), continent: None }],
            &[
                Commodity { code: 78, name: "Roundwood".into() },
                Commodity { code: 84, name: "Sawnwood".into() },
            ],
        )
        .unwrap()
    }

    fn market(len: usize) -> Market {
        Market {
            demand: crate::domain::DemandTable::zeros(len),
            supply: crate::domain::SupplyTable::zeros(len),
            import: TradeTable::zeros(len),
            export: TradeTable::zeros(len),
            manufacture: crate::domain::ManufactureTable::zeros(len),
            forest: ForestTable::zeros(2),
            recycling: crate::domain::RecyclingTable::zeros(len),
            coefficients: Vec::new(),
            world_price: vec![0.0; 2],
        }
    }

    #[test]
    fn test_transport_cost_formula() {
        let mut m = market(4);
        m.import.freight_cost[0] = 10.0;
        m.import.import_tax_rate[0] = 0.1;
        m.import.price[0] = 90.0;
        m.import.export_tax_rate[0] = 0.05;
        m.export.price[0] = 80.0;
        let cost = transport_cost(&m.import, &m.export);
        assert!((cost[0] - (10.0 + 10.0 + 4.0)).abs() < 1e-12, "Got {}", cost[0]);
    }

    #[test]
    fn test_import_price_only_for_importers() {
        let idx = index();
        let mut m = market(idx.len());
        m.import.quantity[1] = 5.0;
        m.import.transport_cost[1] = 3.0;
        apply_world_price(&idx, &mut m, &[50.0, 200.0]);
        assert_eq!(m.import.price[0], 0.0, "No imports, no import price");
        assert_eq!(m.import.price[1], 203.0);
        assert_eq!(m.export.price[2], 50.0, "Rest of World exports at world price");
    }

    #[test]
    fn test_production_price_adds_raw_material_cost() {
        let idx = index();
        let mut groups = CommodityGroups::default();
        groups.raw.insert(0);
        let coefficients = vec![CoefficientRecord { region: "at".into(), input: 78, output: 84, coefficient: 2.0 }];
        let io = IoMatrix::build(&idx, &coefficients, None).unwrap();
        let mut m = market(idx.len());
        m.supply.price[0] = 30.0;
        m.manufacture.cost[1] = 20.0;
        m.import.price[1] = 100.0;
        production_price(&idx, &groups, &io, &mut m, false);
        // composite input price of roundwood is its supply price, two units per output
        assert!((m.manufacture.raw_material_cost[1] - 60.0).abs() < 1e-9);
        assert!((m.manufacture.total_production_cost[1] - 80.0).abs() < 1e-9);

        production_price(&idx, &groups, &io, &mut m, true);
        assert!(m.manufacture.total_production_cost[1] <= 100.0 + 1e-9, "Capped cost must not exceed import price");
    }

    #[test]
    fn test_forest_constants_reproduce_base_growth() {
        let mut forest = ForestTable::zeros(1);
        forest.gdp_per_capita[0] = 40_000.0;
        forest.area_growth[0] = 0.01;
        forest.area_gdp_linear[0] = 0.002;
        forest.area_gdp_square[0] = 0.01;
        forest.stock[0] = 3000.0;
        forest.area[0] = 10.0;
        forest.stock_growth[0] = 0.02;
        forest.stock_elasticity_area[0] = 0.5;
        forest_growth_constants(&mut forest);
        let gdp = 40.0;
        let area_rate = (forest.alpha[0] + 0.002 * gdp) * (0.01 * gdp).exp();
        assert!((area_rate - 0.01).abs() < 1e-12, "Alpha must reproduce the base area growth");
        let stock_rate = forest.gamma[0] * (3000.0f64 / 10.0).powf(0.5);
        assert!((stock_rate - 0.02).abs() < 1e-9);
    }
}
