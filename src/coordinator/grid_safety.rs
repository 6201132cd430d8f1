//! Grid-safety analysis coordinator.
//!
//! Per inbound [`GridSafetyAnalysisEvent`] the coordinator validates the
//! target date against gate closure, gathers the planboard inputs, invokes
//! the registered grid-safety step, persists the resulting rows as one
//! batch, classifies each PTU's regime, and dispatches the follow-up event.
//!
//! One run executes to completion; callers must serialize runs for the same
//! (connection group, period) pair. Any repository or step failure aborts
//! the run before anything is persisted.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::events::{
    ColoringProcessEvent, CreateFlexRequestEvent, GridSafetyAnalysisEvent, OutboundEvent,
};
use crate::config::GateClosure;
use crate::domain::{ConnectionGroup, Disposition, GridSafetyAnalysis, PtuId, Regime};
use crate::error::WorkflowError;
use crate::repo::DsoPlanboardRepository;
use crate::workflow::{steps, GridSafetyStepInput, SequenceGenerator, StepExecutor, StepInput};

pub struct GridSafetyCoordinator {
    gate_closure: GateClosure,
    executor: Arc<StepExecutor>,
    planboard: Arc<dyn DsoPlanboardRepository>,
    sequences: Arc<SequenceGenerator>,
    events_tx: mpsc::UnboundedSender<OutboundEvent>,
}

impl GridSafetyCoordinator {
    /// Build a coordinator together with the receiving end of its outbound
    /// event channel.
    pub fn new(
        gate_closure: GateClosure,
        executor: Arc<StepExecutor>,
        planboard: Arc<dyn DsoPlanboardRepository>,
        sequences: Arc<SequenceGenerator>,
    ) -> (Self, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let coordinator = Self { gate_closure, executor, planboard, sequences, events_tx };
        (coordinator, events_rx)
    }

    /// Run one grid-safety analysis for the event's congestion point and
    /// period.
    pub async fn handle(&self, event: GridSafetyAnalysisEvent) -> Result<(), WorkflowError> {
        self.handle_at(event, Utc::now()).await
    }

    pub(crate) async fn handle_at(
        &self,
        event: GridSafetyAnalysisEvent,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        info!(
            entity_address = %event.entity_address,
            period = %event.period,
            "starting grid safety analysis"
        );

        // Received -> Validated
        let first_open = self.gate_closure.first_open_period(now);
        if event.period < first_open {
            // Recovered locally: logged, nothing persisted, no events fired.
            let rejection = WorkflowError::Validation(format!(
                "grid safety analysis is not allowed for the date {}, first open period is {}",
                event.period, first_open
            ));
            warn!(error = %rejection, "the workflow is stopped");
            return Ok(());
        }
        let connection_group = ConnectionGroup::congestion_point(&event.entity_address);

        // Validated -> Gathered
        let ptus = self.planboard.ptu_containers(event.period).await?;
        if ptus.is_empty() {
            return Err(WorkflowError::Invariant(format!(
                "no PTU containers provisioned for {}",
                event.period
            )));
        }
        let d_prognoses = self
            .planboard
            .last_d_prognoses(event.period, &event.entity_address)
            .await?;
        let forecasts = self
            .planboard
            .last_non_aggregator_forecasts(event.period, &event.entity_address)
            .await?;
        let active_aggregators = self
            .planboard
            .active_aggregator_count(&event.entity_address, event.period)
            .await?;
        let previous = self
            .planboard
            .last_grid_safety_analysis(&event.entity_address, event.period)
            .await?;
        if !previous.is_empty() {
            debug!(
                rows = previous.len(),
                sequence = previous[0].sequence,
                "previous analysis run will be superseded"
            );
        }

        // Gathered -> Computed
        let input = GridSafetyStepInput::builder(event.period, event.entity_address.clone())
            .d_prognoses(d_prognoses.clone())
            .non_aggregator_forecasts(forecasts)
            .build();
        let output = self
            .executor
            .invoke(steps::DSO_CREATE_GRID_SAFETY_ANALYSIS, StepInput::GridSafety(input))
            .await?
            .into_grid_safety(steps::DSO_CREATE_GRID_SAFETY_ANALYSIS)?;

        // Computed -> Persisted
        let sequence = self.sequences.next();
        let by_index: HashMap<u32, _> =
            output.ptus.iter().map(|ptu| (ptu.ptu_index, ptu)).collect();

        let mut rows = Vec::with_capacity(ptus.len());
        let mut requested_indexes = Vec::new();
        for ptu in &ptus {
            let analysis = by_index.get(&ptu.index()).ok_or_else(|| {
                WorkflowError::ContractViolation {
                    step: steps::DSO_CREATE_GRID_SAFETY_ANALYSIS.to_string(),
                    detail: format!("result is missing PTU {}", ptu.index()),
                }
            })?;
            if analysis.disposition == Disposition::Requested {
                requested_indexes.push(ptu.index());
            }
            rows.push(GridSafetyAnalysis {
                connection_group: connection_group.clone(),
                ptu: *ptu,
                power: analysis.power,
                disposition: analysis.disposition,
                sequence,
                prognosis_sequences: d_prognoses
                    .iter()
                    .filter(|p| p.ptu.index() == ptu.index())
                    .map(|p| p.sequence)
                    .collect(),
            });
        }

        let dispositions: HashMap<PtuId, Disposition> =
            rows.iter().map(|row| (row.ptu, row.disposition)).collect();
        self.planboard.store_grid_safety_analysis(rows).await?;

        for ptu in &ptus {
            let mut state = self
                .planboard
                .find_or_create_ptu_state(*ptu, &connection_group)
                .await?;
            state.set_regime(classify(dispositions[ptu], active_aggregators));
            self.planboard.save_ptu_state(state).await?;
        }

        // Persisted -> Dispatched
        if active_aggregators == 0 {
            info!(
                entity_address = %event.entity_address,
                "no active aggregators, falling back to the coloring process"
            );
            self.dispatch(OutboundEvent::ColoringProcess(ColoringProcessEvent {
                entity_address: event.entity_address.clone(),
                period: event.period,
            }));
        } else if !requested_indexes.is_empty() {
            self.dispatch(OutboundEvent::CreateFlexRequest(CreateFlexRequestEvent {
                entity_address: event.entity_address.clone(),
                period: event.period,
                requested_ptu_indexes: requested_indexes.clone(),
            }));
        }

        info!(
            entity_address = %event.entity_address,
            period = %event.period,
            requested_ptus = requested_indexes.len(),
            active_aggregators,
            "grid safety analysis completed"
        );
        Ok(())
    }

    fn dispatch(&self, event: OutboundEvent) {
        if self.events_tx.send(event).is_err() {
            error!("outbound event receiver dropped, event lost");
        }
    }
}

/// Safety color for one PTU: escalate straight to red only when flexibility
/// is needed and nobody can deliver it.
fn classify(disposition: Disposition, active_aggregators: u64) -> Regime {
    match disposition {
        Disposition::Requested if active_aggregators == 0 => Regime::Red,
        Disposition::Requested => Regime::Yellow,
        Disposition::Available => Regime::Green,
    }
}
