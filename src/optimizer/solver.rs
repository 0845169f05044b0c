use clarabel::solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus};
use tracing::{debug, info};

use super::QpProblem;
use crate::config::SolverConfig;
use crate::error::{EngineError, EngineResult};

/// Primal and dual solution of one period
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub x: Vec<f64>,
    /// Dual values, one per constraint row
    pub z: Vec<f64>,
    pub objective: f64,
    pub iterations: u32,
    pub status: String,
    pub solve_time_ms: u128,
}

/// Solve a period QP with the interior-point conic solver
pub fn solve(problem: &QpProblem, settings: &SolverConfig, period: usize) -> EngineResult<SolverOutcome> {
    let start = std::time::Instant::now();
    let solver_settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .max_iter(settings.max_iter)
        .tol_gap_abs(settings.tol_gap_abs)
        .tol_gap_rel(settings.tol_gap_rel)
        .build()
        .map_err(|e| EngineError::solver(period, format!("invalid solver settings: {e:?}")))?;

    debug!(
        period,
        variables = problem.variables(),
        constraints = problem.constraints(),
        "Solving period QP"
    );

    let mut solver = DefaultSolver::new(
        &problem.p,
        &problem.q,
        &problem.a,
        &problem.b,
        &problem.cones,
        solver_settings,
    )
    .map_err(|e| EngineError::solver(period, format!("solver initialization failed: {e:?}")))?;

    solver.solve();

    let sol = &solver.solution;
    if !matches!(sol.status, SolverStatus::Solved | SolverStatus::AlmostSolved) {
        return Err(EngineError::solver(
            period,
            format!("solver returned status {:?} after {} iterations", sol.status, sol.iterations),
        ));
    }

    let outcome = SolverOutcome {
        x: sol.x.clone(),
        z: sol.z.clone(),
        objective: -sol.obj_val,
        iterations: sol.iterations,
        status: format!("{:?}", sol.status),
        solve_time_ms: start.elapsed().as_millis(),
    };
    info!(
        period,
        status = %outcome.status,
        iterations = outcome.iterations,
        objective = outcome.objective,
        solve_time_ms = outcome.solve_time_ms as u64,
        "Period QP solved"
    );
    Ok(outcome)
}
