pub mod constraints;
pub mod problem;
pub mod solver;
pub mod strategies;
pub mod types;

pub use constraints::*;
pub use problem::*;
pub use solver::*;
pub use strategies::*;
pub use types::*;

use tracing::debug;

use crate::domain::DomainKind;

/// Assembled period model with the handles needed to read its solution
pub struct PeriodModel {
    pub problem: QpProblem,
    pub handles: ModelHandles,
    pub layout: VariableLayout,
    pub terms: ObjectiveTerms,
}

/// Build objective and constraints of one period.
///
/// Constraint blocks are appended in a fixed order; the returned handles
/// locate each block for dual lookup.
pub fn build_model(input: &ModelInput<'_>) -> PeriodModel {
    let index = &input.world.index;
    let mut layout = VariableLayout::new(index.len());
    let mut qp = QpBuilder::new(layout.quantity_vars());

    let terms = objective_terms(input, &layout);
    add_objective(&mut qp, &terms);

    let trade = trade_bounds(input, &mut layout, &mut qp);
    let supply_upper = upper_bound(input, &layout, DomainKind::Supply, &mut qp);
    let manufacture_upper = upper_bound(input, &layout, DomainKind::Manufacture, &mut qp);
    let max_harvest = max_harvest(input, &layout, &mut qp);

    let short_io = input.io.short();
    let ctx = BalanceContext {
        index,
        groups: &input.world.groups,
        io: &short_io,
        layout: &layout,
    };
    let strategy = strategy_for(input.material_balance);
    let material_balance = strategy.build(&ctx, &mut qp);

    let rest_of_world = rest_of_world(input, &layout, &mut qp);
    let global_balance = input
        .global_material_balance
        .then(|| global_balance(&ctx, &mut qp));
    let demand_bounds = demand_bounds(input, &layout, &mut qp);
    let nonnegativity = nonnegativity(&layout, &mut qp);

    debug!(
        period = input.period.period,
        mode = %strategy.mode(),
        balance_rows = material_balance.row_count(),
        variables = qp.variables(),
        rows = qp.rows(),
        "Built period model"
    );

    let handles = ModelHandles {
        trade,
        supply_upper,
        manufacture_upper,
        max_harvest,
        material_balance,
        rest_of_world,
        global_balance,
        demand_bounds,
        nonnegativity,
    };
    PeriodModel {
        problem: qp.build(),
        handles,
        layout,
        terms,
    }
}
