//! Typed step parameter contracts.
//!
//! Each workflow step declares its IN and OUT parameters as a plain struct;
//! the [`StepInput`]/[`StepOutput`] unions carry exactly one of them per
//! invocation. A handler that receives a variant it did not declare answers
//! with a contract violation instead of silently reading foreign keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Disposition, NonAggregatorForecast, PtuPrognosis};
use crate::error::WorkflowError;

/// One PTU of a grid-safety computation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtuSafetyAnalysis {
    /// 1-based PTU index within the period.
    pub ptu_index: u32,
    pub power: i64,
    pub disposition: Disposition,
}

/// IN contract of the `DSO_CREATE_GRID_SAFETY_ANALYSIS` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSafetyStepInput {
    pub period: NaiveDate,
    pub congestion_point: String,
    pub d_prognoses: Vec<PtuPrognosis>,
    pub non_aggregator_forecasts: Vec<NonAggregatorForecast>,
}

impl GridSafetyStepInput {
    pub fn builder(period: NaiveDate, congestion_point: impl Into<String>) -> GridSafetyStepInputBuilder {
        GridSafetyStepInputBuilder {
            period,
            congestion_point: congestion_point.into(),
            d_prognoses: Vec::new(),
            non_aggregator_forecasts: Vec::new(),
        }
    }
}

pub struct GridSafetyStepInputBuilder {
    period: NaiveDate,
    congestion_point: String,
    d_prognoses: Vec<PtuPrognosis>,
    non_aggregator_forecasts: Vec<NonAggregatorForecast>,
}

impl GridSafetyStepInputBuilder {
    pub fn d_prognoses(mut self, prognoses: Vec<PtuPrognosis>) -> Self {
        self.d_prognoses = prognoses;
        self
    }

    pub fn non_aggregator_forecasts(mut self, forecasts: Vec<NonAggregatorForecast>) -> Self {
        self.non_aggregator_forecasts = forecasts;
        self
    }

    pub fn build(self) -> GridSafetyStepInput {
        GridSafetyStepInput {
            period: self.period,
            congestion_point: self.congestion_point,
            d_prognoses: self.d_prognoses,
            non_aggregator_forecasts: self.non_aggregator_forecasts,
        }
    }
}

/// OUT contract of the `DSO_CREATE_GRID_SAFETY_ANALYSIS` step: one entry per
/// PTU of the period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSafetyStepOutput {
    pub congestion_point: String,
    pub period: NaiveDate,
    pub ptus: Vec<PtuSafetyAnalysis>,
}

/// IN contract of the `DSO_MONITOR_GRID` step, evaluated per PTU while a
/// trading day is in operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorGridStepInput {
    pub period: NaiveDate,
    pub congestion_point: String,
    pub ptu_index: u32,
    pub connection_count: u64,
    /// Power already limited by flex orders in operation.
    pub limited_power: i64,
}

/// OUT contract of the `DSO_MONITOR_GRID` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorGridStepOutput {
    pub congestion: bool,
    pub actual_load: i64,
    pub max_load: i64,
    pub min_load: i64,
}

/// Tagged union of every declared step IN contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    GridSafety(GridSafetyStepInput),
    MonitorGrid(MonitorGridStepInput),
}

/// Tagged union of every declared step OUT contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    GridSafety(GridSafetyStepOutput),
    MonitorGrid(MonitorGridStepOutput),
}

impl StepOutput {
    /// Unwrap a grid-safety result, or report a violated OUT contract.
    pub fn into_grid_safety(self, step: &str) -> Result<GridSafetyStepOutput, WorkflowError> {
        match self {
            StepOutput::GridSafety(out) => Ok(out),
            other => Err(WorkflowError::ContractViolation {
                step: step.to_string(),
                detail: format!("expected a grid-safety result, got {other:?}"),
            }),
        }
    }

    pub fn into_monitor_grid(self, step: &str) -> Result<MonitorGridStepOutput, WorkflowError> {
        match self {
            StepOutput::MonitorGrid(out) => Ok(out),
            other => Err(WorkflowError::ContractViolation {
                step: step.to_string(),
                detail: format!("expected a monitor-grid result, got {other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_safety_input_builder() {
        let period = NaiveDate::from_ymd_opt(2015, 6, 11).unwrap();
        let input = GridSafetyStepInput::builder(period, "ean.12340001").build();
        assert_eq!(input.congestion_point, "ean.12340001");
        assert!(input.d_prognoses.is_empty());
        assert!(input.non_aggregator_forecasts.is_empty());
    }

    #[test]
    fn test_output_unwrap_mismatch() {
        let out = StepOutput::MonitorGrid(MonitorGridStepOutput {
            congestion: false,
            actual_load: 0,
            max_load: 0,
            min_load: 0,
        });
        let err = out.into_grid_safety("DSO_CREATE_GRID_SAFETY_ANALYSIS").unwrap_err();
        assert!(matches!(err, WorkflowError::ContractViolation { .. }));
    }
}
