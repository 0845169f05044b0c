use crate::alignment::{PeriodInfo, World};
use crate::config::WorldPriceMode;
use crate::error::{EngineError, EngineResult};
use crate::optimizer::RestOfWorldHandle;

/// World price per commodity under the configured policy
pub fn world_price(
    mode: WorldPriceMode,
    world: &World,
    handle: &RestOfWorldHandle,
    z: &[f64],
    period: &PeriodInfo,
) -> EngineResult<Vec<f64>> {
    match mode {
        WorldPriceMode::Shadow => {
            let export = handle.export_pin.duals(z);
            let import = handle.import_pin.duals(z);
            Ok(export.iter().zip(import).map(|(e, i)| e.abs() + i.abs()).collect())
        }
        WorldPriceMode::Constant => Ok(world.base_world_price.clone()),
        WorldPriceMode::Average => Err(EngineError::UnsupportedWorldPriceMode(mode)),
        WorldPriceMode::Exogenous => world
            .world_price_series
            .get(&period.year)
            .cloned()
            .ok_or_else(|| EngineError::data_shape(format!("no exogenous world price for year {}", period.year))),
    }
}

/// Fail before any period runs when the world price policy cannot be served
pub fn check_world_price_mode(mode: WorldPriceMode, world: &World) -> EngineResult<()> {
    match mode {
        WorldPriceMode::Average => Err(EngineError::UnsupportedWorldPriceMode(mode)),
        WorldPriceMode::Exogenous => {
            match world.periods.iter().find(|p| !world.world_price_series.contains_key(&p.year)) {
                Some(missing) => Err(EngineError::data_shape(format!(
                    "exogenous world price series lacks year {}",
                    missing.year
                ))),
                None => Ok(()),
            }
        }
        WorldPriceMode::Shadow | WorldPriceMode::Constant => Ok(()),
    }
}
