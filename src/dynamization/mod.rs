//! Exogenous state propagation between periods.

pub mod domains;
pub mod forest;
pub mod primitives;

pub use domains::*;
pub use forest::*;
pub use primitives::*;

use tracing::info;

use crate::alignment::{PeriodInfo, World};
use crate::config::CommodityConventions;
use crate::domain::Market;

/// Advance every exogenously driven domain of the market to the given period.
///
/// Forest runs before supply so supply can follow the realised forest change.
pub fn dynamize(world: &World, market: &mut Market, period: &PeriodInfo, conventions: &CommodityConventions) {
    if period.period == 0 {
        return;
    }
    let block = world.exogenous_block(period.block);

    dynamize_demand(&mut market.demand, &block, period);
    let forest = dynamize_forest(
        &world.index,
        &world.groups,
        &mut market.forest,
        &market.supply,
        &block,
        period,
    );
    dynamize_supply(&world.index, &mut market.supply, &forest, &block, period, conventions);
    dynamize_manufacture(market, &block, period);
    dynamize_transport(market, &block, period);

    info!(
        period = period.period,
        block = period.block,
        length = period.length,
        year = period.year,
        "Dynamized market"
    );
}
