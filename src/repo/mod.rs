//! Repository contracts consumed by the coordinators.
//!
//! Implementations own persistence mapping and transaction demarcation; the
//! core only states what it reads and writes. [`memory::InMemoryPlanboard`]
//! backs tests and local simulation.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    ConnectionGroup, FlexOffer, FlexOrder, GridSafetyAnalysis, NonAggregatorForecast,
    PtuId, PtuPrognosis, PtuState,
};

#[cfg(feature = "sim")]
pub mod memory;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("data access failed: {0}")]
    Access(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Planboard data the grid operator's coordinators read and write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DsoPlanboardRepository: Send + Sync {
    /// PTU containers provisioned for the period, ordered by index.
    async fn ptu_containers(&self, period: NaiveDate) -> Result<Vec<PtuId>, RepositoryError>;

    /// Latest accepted D-prognosis rows for the period, one per
    /// (participant, PTU).
    async fn last_d_prognoses(
        &self,
        period: NaiveDate,
        entity_address: &str,
    ) -> Result<Vec<PtuPrognosis>, RepositoryError>;

    /// Latest non-aggregator forecast rows for the period.
    async fn last_non_aggregator_forecasts(
        &self,
        period: NaiveDate,
        entity_address: &str,
    ) -> Result<Vec<NonAggregatorForecast>, RepositoryError>;

    /// Number of aggregators active on the connection group for the period.
    async fn active_aggregator_count(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<u64, RepositoryError>;

    /// Rows of the most recent grid-safety analysis run, if any.
    async fn last_grid_safety_analysis(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<Vec<GridSafetyAnalysis>, RepositoryError>;

    /// Persist one complete analysis run. Implementations must commit all
    /// rows or none.
    async fn store_grid_safety_analysis(
        &self,
        rows: Vec<GridSafetyAnalysis>,
    ) -> Result<(), RepositoryError>;

    /// Current state for the (PTU, connection group) pair, created on first
    /// touch.
    async fn find_or_create_ptu_state(
        &self,
        ptu: PtuId,
        connection_group: &ConnectionGroup,
    ) -> Result<PtuState, RepositoryError>;

    async fn save_ptu_state(&self, state: PtuState) -> Result<(), RepositoryError>;

    /// Accepted flex orders for the period, settlement input.
    async fn accepted_flex_orders(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<Vec<FlexOrder>, RepositoryError>;

    /// Accepted flex offers for the period.
    async fn accepted_flex_offers(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<Vec<FlexOffer>, RepositoryError>;
}
