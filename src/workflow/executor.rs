//! Named-step dispatch.
//!
//! Business computations register under stable string names shared with
//! external configuration; the executor only looks them up and applies the
//! same tracing around every invocation. It holds no mutable state, so
//! independent invocations can run concurrently.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, Instrument};

use super::context::{StepInput, StepOutput};
use crate::error::WorkflowError;

/// A pluggable business computation: accept a typed input, return a typed
/// output. Persistence side effects belong inside implementations, never in
/// the executor.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    async fn invoke(&self, input: StepInput) -> Result<StepOutput, WorkflowError>;
}

/// Immutable dispatch table from step name to handler.
pub struct StepExecutor {
    steps: HashMap<String, Arc<dyn WorkflowStep>>,
}

impl StepExecutor {
    pub fn builder() -> StepExecutorBuilder {
        StepExecutorBuilder { steps: HashMap::new() }
    }

    pub fn is_registered(&self, step_name: &str) -> bool {
        self.steps.contains_key(step_name)
    }

    /// Dispatch `input` to the handler registered under `step_name`.
    pub async fn invoke(
        &self,
        step_name: &str,
        input: StepInput,
    ) -> Result<StepOutput, WorkflowError> {
        let step = self
            .steps
            .get(step_name)
            .ok_or_else(|| WorkflowError::UnknownStep(step_name.to_string()))?;

        let span = tracing::debug_span!("workflow_step", step = step_name);
        let started = Instant::now();
        let result = step.invoke(input).instrument(span).await;
        debug!(
            step = step_name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "workflow step finished"
        );
        result
    }
}

pub struct StepExecutorBuilder {
    steps: HashMap<String, Arc<dyn WorkflowStep>>,
}

impl StepExecutorBuilder {
    pub fn register(mut self, step_name: impl Into<String>, step: Arc<dyn WorkflowStep>) -> Self {
        self.steps.insert(step_name.into(), step);
        self
    }

    pub fn build(self) -> StepExecutor {
        StepExecutor { steps: self.steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::context::{MonitorGridStepInput, MonitorGridStepOutput};
    use chrono::NaiveDate;

    /// Echoes a fixed monitor-grid result, rejecting foreign inputs.
    struct StubMonitorStep;

    #[async_trait]
    impl WorkflowStep for StubMonitorStep {
        async fn invoke(&self, input: StepInput) -> Result<StepOutput, WorkflowError> {
            match input {
                StepInput::MonitorGrid(input) => Ok(StepOutput::MonitorGrid(MonitorGridStepOutput {
                    congestion: input.limited_power > 0,
                    actual_load: input.limited_power,
                    max_load: 5000,
                    min_load: -5000,
                })),
                other => Err(WorkflowError::ContractViolation {
                    step: "DSO_MONITOR_GRID".into(),
                    detail: format!("undeclared input {other:?}"),
                }),
            }
        }
    }

    fn monitor_input() -> StepInput {
        StepInput::MonitorGrid(MonitorGridStepInput {
            period: NaiveDate::from_ymd_opt(2015, 6, 11).unwrap(),
            congestion_point: "ean.12340001".into(),
            ptu_index: 1,
            connection_count: 10,
            limited_power: 1000,
        })
    }

    #[tokio::test]
    async fn test_invoke_registered_step() {
        let executor = StepExecutor::builder()
            .register("DSO_MONITOR_GRID", Arc::new(StubMonitorStep))
            .build();

        assert!(executor.is_registered("DSO_MONITOR_GRID"));

        let out = executor
            .invoke("DSO_MONITOR_GRID", monitor_input())
            .await
            .unwrap()
            .into_monitor_grid("DSO_MONITOR_GRID")
            .unwrap();
        assert!(out.congestion);
        assert_eq!(out.actual_load, 1000);
    }

    #[tokio::test]
    async fn test_unknown_step_is_rejected() {
        let executor = StepExecutor::builder().build();

        let err = executor
            .invoke("DSO_CREATE_GRID_SAFETY_ANALYSIS", monitor_input())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownStep(name) if name == "DSO_CREATE_GRID_SAFETY_ANALYSIS"));
    }

    #[tokio::test]
    async fn test_undeclared_input_is_a_contract_violation() {
        let executor = StepExecutor::builder()
            .register("DSO_MONITOR_GRID", Arc::new(StubMonitorStep))
            .build();

        let foreign = StepInput::GridSafety(
            crate::workflow::context::GridSafetyStepInput::builder(
                NaiveDate::from_ymd_opt(2015, 6, 11).unwrap(),
                "ean.12340001",
            )
            .build(),
        );
        let err = executor.invoke("DSO_MONITOR_GRID", foreign).await.unwrap_err();
        assert!(matches!(err, WorkflowError::ContractViolation { .. }));
    }
}
