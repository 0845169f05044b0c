//! Multi-period equilibrium engine for the global forest products trade.
//!
//! Each period calibrates linear price curves around the previous solution,
//! maximizes net social welfare subject to material balance, trade inertia and
//! forest harvest limits, and carries the solved market into the next period.

pub mod alignment;
pub mod bounds;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod domain;
pub mod dynamization;
pub mod error;
pub mod extraction;
pub mod optimizer;
pub mod orchestrator;
pub mod pricing;
pub mod telemetry;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{RunOutput, Simulation};
