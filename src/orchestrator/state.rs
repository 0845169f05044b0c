use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alignment::PeriodInfo;
use crate::bounds::Bounds;
use crate::calibration::Calibration;
use crate::domain::Market;
use crate::extraction::PeriodResult;

/// Immutable record of one solved period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodState {
    pub info: PeriodInfo,
    /// Market after extraction: the solved prices and quantities of this period
    pub market: Market,
    pub calibration: Calibration,
    pub bounds: Bounds,
    pub result: PeriodResult,
    pub solve_time_ms: u128,
    pub recorded_at: DateTime<Utc>,
}

impl PeriodState {
    pub fn period(&self) -> usize {
        self.info.period
    }

    pub fn year(&self) -> i32 {
        self.info.year
    }
}

/// Why a run stopped before the last configured period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub period: usize,
    pub message: String,
}
