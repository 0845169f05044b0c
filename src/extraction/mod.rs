//! Map the solved period back onto the market.

pub mod prices;
pub mod verification;
pub mod world_price;

pub use prices::*;
pub use verification::*;
pub use world_price::*;

use serde::{Deserialize, Serialize};

use crate::alignment::{IoMatrix, PeriodInfo, World};
use crate::bounds::Bounds;
use crate::config::{ModelConfig, ProductPriceMode};
use crate::constants::NON_ZERO;
use crate::domain::{DomainKind, Market};
use crate::error::EngineResult;
use crate::optimizer::{BalanceContext, ModelHandles, SolverOutcome, VariableLayout};

/// Quantities and prices of one domain after the solve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    /// Solver quantity floored at a tiny positive value
    pub optimized: Vec<f64>,
    /// Quantity clipped into its bounds
    pub cleaned: Vec<f64>,
    pub price: Vec<f64>,
    /// Shadow price before any correction; empty for trade and manufacturing
    pub shadow_price: Vec<f64>,
}

/// Everything extracted from one period's solution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub demand: DomainResult,
    pub export: DomainResult,
    pub import: DomainResult,
    pub manufacture: DomainResult,
    pub supply: DomainResult,
    pub world_price: Vec<f64>,
    pub shadow_price_corrections: usize,
    pub verification: VerificationReport,
    pub objective: f64,
    pub iterations: u32,
    pub status: String,
}

impl PeriodResult {
    pub fn domain(&self, kind: DomainKind) -> &DomainResult {
        match kind {
            DomainKind::Demand => &self.demand,
            DomainKind::Export => &self.export,
            DomainKind::Import => &self.import,
            DomainKind::Manufacture => &self.manufacture,
            DomainKind::Supply => &self.supply,
        }
    }

    fn domain_mut(&mut self, kind: DomainKind) -> &mut DomainResult {
        match kind {
            DomainKind::Demand => &mut self.demand,
            DomainKind::Export => &mut self.export,
            DomainKind::Import => &mut self.import,
            DomainKind::Manufacture => &mut self.manufacture,
            DomainKind::Supply => &mut self.supply,
        }
    }
}

pub struct ExtractionInput<'a> {
    pub world: &'a World,
    pub io: &'a IoMatrix,
    pub bounds: &'a Bounds,
    pub handles: &'a ModelHandles,
    pub layout: &'a VariableLayout,
    pub outcome: &'a SolverOutcome,
    pub period: &'a PeriodInfo,
    pub model: &'a ModelConfig,
}

/// Derive quantities and prices from the solution and write them into the market
pub fn extract(input: &ExtractionInput<'_>, market: &mut Market) -> EngineResult<PeriodResult> {
    let world = input.world;
    let index = &world.index;
    let groups = &world.groups;
    let x = &input.outcome.x;
    let z = &input.outcome.z;
    let model = input.model;

    let world_price = world_price(model.world_price_mode, world, &input.handles.rest_of_world, z, input.period)?;

    let mut result = PeriodResult {
        world_price: world_price.clone(),
        objective: input.outcome.objective,
        iterations: input.outcome.iterations,
        status: input.outcome.status.clone(),
        ..Default::default()
    };

    for kind in DomainKind::all() {
        let block = &x[input.layout.block(kind)];
        let entry = result.domain_mut(kind);
        entry.optimized = block.iter().map(|q| q.max(NON_ZERO)).collect();
        entry.cleaned = clip_to_bounds(block, input.bounds.lower(kind), input.bounds.upper(kind));
    }

    // trade prices, ahead of the product prices capped by them
    result.export.price = (0..index.len()).map(|cell| world_price[index.commodity_of(cell)]).collect();
    let transport = calculated_price(
        &market.import.transport_cost,
        &result.import.optimized,
        &market.import.quantity,
        &market.import.elasticity,
    );
    result.import.price = (0..index.len())
        .map(|cell| transport[cell] + world_price[index.commodity_of(cell)])
        .collect();

    // product prices
    for kind in [DomainKind::Demand, DomainKind::Supply, DomainKind::Manufacture] {
        let previous_price = market.price(kind);
        let calculated = calculated_price(
            previous_price,
            &result.domain(kind).cleaned,
            market.quantity(kind),
            market.elasticity(kind),
        );

        let (price, shadow) = match (kind, model.price_mode) {
            (DomainKind::Manufacture, _) => (calculated, Vec::new()),
            (_, ProductPriceMode::Shadow) => {
                let shadow = shadow_prices(index, groups, &input.handles.material_balance, z, previous_price);
                let mut corrected = shadow.clone();
                result.shadow_price_corrections +=
                    correct_shadow_prices(&mut corrected, previous_price, &calculated, &kind.to_string());
                (corrected, shadow)
            }
            (DomainKind::Supply, ProductPriceMode::Calculated) if model.capped_prices => {
                let capped = cap_prices(&calculated, &result.import.price, |cell| {
                    groups.other_roundwood == Some(index.commodity_of(cell))
                });
                (capped, Vec::new())
            }
            (_, ProductPriceMode::Calculated) => (calculated, Vec::new()),
        };
        let entry = result.domain_mut(kind);
        entry.price = price;
        entry.shadow_price = shadow;
    }

    let short_io = input.io.short();
    let ctx = BalanceContext {
        index,
        groups,
        io: &short_io,
        layout: input.layout,
    };
    result.verification = verify(&ctx, input.bounds, x, input.period.period);

    for kind in DomainKind::all() {
        let entry = result.domain(kind);
        let stored = if model.cleaned_quantities { &entry.cleaned } else { &entry.optimized };
        *market.quantity_mut(kind) = stored.clone();
        *market.price_mut(kind) = entry.price.clone();
    }
    market.world_price = world_price;

    Ok(result)
}
