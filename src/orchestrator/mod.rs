//! Period loop: base period, then follow periods until the horizon or a failure.

pub mod output;
pub mod state;

pub use output::*;
pub use state::*;

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::alignment::{align, PeriodInfo, World};
use crate::bounds::compute_bounds;
use crate::calibration::{calibrate, PreviousCalibration};
use crate::config::Config;
use crate::domain::{Market, WorldInput};
use crate::dynamization::dynamize;
use crate::error::{EngineError, EngineResult};
use crate::extraction::{check_world_price_mode, extract, ExtractionInput};
use crate::optimizer::{build_model, solve, ModelInput};
use crate::pricing::{apply_world_price, forest_growth_constants, production_price, transport_cost};

/// A configured multi-period run over one aligned world
pub struct Simulation {
    config: Config,
    world: World,
    market: Market,
    history: Vec<PeriodState>,
}

impl Simulation {
    /// Align the input and reject world price policies that cannot be served
    pub fn new(config: Config, input: &WorldInput) -> EngineResult<Self> {
        let (world, market) = align(input, &config)?;
        check_world_price_mode(config.model.world_price_mode, &world)?;
        info!(
            regions = world.index.real_region_count(),
            commodities = world.index.commodity_count(),
            periods = world.periods.len(),
            base_year = world.base_year,
            "Simulation initialized"
        );
        Ok(Self {
            config,
            world,
            market,
            history: Vec::new(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn history(&self) -> &[PeriodState] {
        &self.history
    }

    /// Run every period; a failing period stops the run and keeps what was recorded
    pub fn run(&mut self) -> RunOutput {
        let periods: Vec<PeriodInfo> = self.world.periods.iter().copied().collect();
        let mut failure = None;
        for period in periods {
            match self.step(&period) {
                Ok(state) => self.history.push(state),
                Err(e) => {
                    error!(period = period.period, error = %e, "Period failed, stopping run");
                    failure = Some(RunFailure {
                        period: period.period,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }
        info!(completed = self.history.len(), failed = failure.is_some(), "Run finished");
        RunOutput::build(&self.world.index, &self.history, failure)
    }

    /// Prepare, solve and extract one period
    #[instrument(skip(self), fields(period = period.period, year = period.year))]
    pub fn step(&mut self, period: &PeriodInfo) -> EngineResult<PeriodState> {
        let model_config = &self.config.model;
        let world = &self.world;
        let index = &world.index;
        let market = &mut self.market;

        if period.period == 0 {
            market.import.transport_cost = transport_cost(&market.import, &market.export);
            market.world_price = world.base_world_price.clone();
        } else if model_config.dynamization {
            dynamize(world, market, period, &self.config.commodities);
        }

        let world_price = market.world_price.clone();
        apply_world_price(index, market, &world_price);
        let io = world.io_matrix(market)?;
        production_price(index, &world.groups, &io, market, model_config.capped_prices);
        if period.period == 0 {
            forest_growth_constants(&mut market.forest);
        }
        let harvest_fraction = world.groups.harvest_fraction(index, &market.forest.fuelwood_fraction);

        let previous = self.history.last().map(|state| PreviousCalibration {
            calibration: &state.calibration,
            market: &state.market,
        });
        let calibration = calibrate(market, model_config.price_mode, period.period, previous);
        let bounds = compute_bounds(
            world,
            market,
            period,
            model_config.dynamization,
            &self.config.commodities,
        );

        let model = build_model(&ModelInput {
            world,
            market,
            io: &io,
            calibration: &calibration,
            bounds: &bounds,
            harvest_fraction: &harvest_fraction,
            period,
            previous_world_price: &world_price,
            material_balance: model_config.material_balance,
            global_material_balance: model_config.global_material_balance,
        });
        let outcome = solve(&model.problem, &self.config.solver, period.period)?;
        if outcome.x.len() < model.layout.quantity_vars() {
            return Err(EngineError::solver(period.period, "solution shorter than the quantity vector"));
        }

        let result = extract(
            &ExtractionInput {
                world,
                io: &io,
                bounds: &bounds,
                handles: &model.handles,
                layout: &model.layout,
                outcome: &outcome,
                period,
                model: model_config,
            },
            market,
        )?;

        info!(
            period = period.period,
            year = period.year,
            objective = result.objective,
            iterations = result.iterations,
            clean = result.verification.is_clean(),
            "Period solved"
        );

        Ok(PeriodState {
            info: *period,
            market: market.clone(),
            calibration,
            bounds,
            result,
            solve_time_ms: outcome.solve_time_ms,
            recorded_at: Utc::now(),
        })
    }
}
