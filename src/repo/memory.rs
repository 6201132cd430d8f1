//! In-memory planboard, used by the integration tests and the sim profile.

use async_trait::async_trait;
use chrono::NaiveDate;
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{DsoPlanboardRepository, RepositoryError};
use crate::domain::{
    self, ConnectionGroup, DocumentStatus, FlexOffer, FlexOrder, GridSafetyAnalysis,
    NonAggregatorForecast, PrognosisType, PtuId, PtuPrognosis, PtuState,
};

#[derive(Default)]
struct Inner {
    prognoses: Vec<PtuPrognosis>,
    forecasts: Vec<NonAggregatorForecast>,
    analyses: Vec<GridSafetyAnalysis>,
    ptu_states: HashMap<(PtuId, String), PtuState>,
    flex_orders: Vec<FlexOrder>,
    flex_offers: Vec<FlexOffer>,
    aggregator_counts: HashMap<(String, NaiveDate), u64>,
}

pub struct InMemoryPlanboard {
    ptu_duration_minutes: u32,
    inner: RwLock<Inner>,
}

impl InMemoryPlanboard {
    pub fn new(ptu_duration_minutes: u32) -> Self {
        Self { ptu_duration_minutes, inner: RwLock::new(Inner::default()) }
    }

    pub fn insert_prognosis(&self, prognosis: PtuPrognosis) {
        self.inner.write().prognoses.push(prognosis);
    }

    pub fn insert_forecast(&self, forecast: NonAggregatorForecast) {
        self.inner.write().forecasts.push(forecast);
    }

    pub fn insert_flex_order(&self, order: FlexOrder) {
        self.inner.write().flex_orders.push(order);
    }

    pub fn insert_flex_offer(&self, offer: FlexOffer) {
        self.inner.write().flex_offers.push(offer);
    }

    pub fn set_active_aggregators(&self, entity_address: &str, period: NaiveDate, count: u64) {
        self.inner
            .write()
            .aggregator_counts
            .insert((entity_address.to_string(), period), count);
    }

    /// Every stored analysis row for the pair, across all runs.
    pub fn analyses_for(&self, entity_address: &str, period: NaiveDate) -> Vec<GridSafetyAnalysis> {
        self.inner
            .read()
            .analyses
            .iter()
            .filter(|row| {
                row.connection_group.entity_address() == entity_address
                    && row.ptu.period() == period
            })
            .cloned()
            .collect()
    }

    pub fn ptu_state(&self, ptu: PtuId, entity_address: &str) -> Option<PtuState> {
        self.inner
            .read()
            .ptu_states
            .get(&(ptu, entity_address.to_string()))
            .cloned()
    }
}

#[async_trait]
impl DsoPlanboardRepository for InMemoryPlanboard {
    async fn ptu_containers(&self, period: NaiveDate) -> Result<Vec<PtuId>, RepositoryError> {
        domain::slices_of_day(period, self.ptu_duration_minutes)
            .map_err(|e| RepositoryError::Access(e.to_string()))
    }

    async fn last_d_prognoses(
        &self,
        period: NaiveDate,
        entity_address: &str,
    ) -> Result<Vec<PtuPrognosis>, RepositoryError> {
        let inner = self.inner.read();
        let rows = inner
            .prognoses
            .iter()
            .filter(|p| {
                p.prognosis_type == PrognosisType::DPrognosis
                    && p.status == DocumentStatus::Accepted
                    && p.ptu.period() == period
                    && p.connection_group.entity_address() == entity_address
            })
            .cloned()
            .into_group_map_by(|p| (p.participant_domain.clone(), p.ptu.index()))
            .into_values()
            .filter_map(|group| group.into_iter().max_by_key(|p| p.sequence))
            .sorted_by_key(|p| (p.participant_domain.clone(), p.ptu.index()))
            .collect();
        Ok(rows)
    }

    async fn last_non_aggregator_forecasts(
        &self,
        period: NaiveDate,
        entity_address: &str,
    ) -> Result<Vec<NonAggregatorForecast>, RepositoryError> {
        let inner = self.inner.read();
        let rows = inner
            .forecasts
            .iter()
            .filter(|f| {
                f.ptu.period() == period && f.connection_group.entity_address() == entity_address
            })
            .cloned()
            .into_group_map_by(|f| f.ptu.index())
            .into_values()
            .filter_map(|group| group.into_iter().max_by_key(|f| f.sequence))
            .sorted_by_key(|f| f.ptu.index())
            .collect();
        Ok(rows)
    }

    async fn active_aggregator_count(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        Ok(self
            .inner
            .read()
            .aggregator_counts
            .get(&(entity_address.to_string(), period))
            .copied()
            .unwrap_or(0))
    }

    async fn last_grid_safety_analysis(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<Vec<GridSafetyAnalysis>, RepositoryError> {
        let inner = self.inner.read();
        let latest_sequence = inner
            .analyses
            .iter()
            .filter(|row| {
                row.connection_group.entity_address() == entity_address
                    && row.ptu.period() == period
            })
            .map(|row| row.sequence)
            .max();

        let Some(sequence) = latest_sequence else {
            return Ok(Vec::new());
        };
        let rows = inner
            .analyses
            .iter()
            .filter(|row| {
                row.sequence == sequence
                    && row.connection_group.entity_address() == entity_address
                    && row.ptu.period() == period
            })
            .cloned()
            .sorted_by_key(|row| row.ptu.index())
            .collect();
        Ok(rows)
    }

    async fn store_grid_safety_analysis(
        &self,
        rows: Vec<GridSafetyAnalysis>,
    ) -> Result<(), RepositoryError> {
        // Single write-lock extend keeps the batch atomic.
        self.inner.write().analyses.extend(rows);
        Ok(())
    }

    async fn find_or_create_ptu_state(
        &self,
        ptu: PtuId,
        connection_group: &ConnectionGroup,
    ) -> Result<PtuState, RepositoryError> {
        let mut inner = self.inner.write();
        let state = inner
            .ptu_states
            .entry((ptu, connection_group.entity_address().to_string()))
            .or_insert_with(|| PtuState::new(ptu, connection_group.clone()));
        Ok(state.clone())
    }

    async fn save_ptu_state(&self, state: PtuState) -> Result<(), RepositoryError> {
        self.inner.write().ptu_states.insert(
            (state.ptu, state.connection_group.entity_address().to_string()),
            state,
        );
        Ok(())
    }

    async fn accepted_flex_orders(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<Vec<FlexOrder>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .flex_orders
            .iter()
            .filter(|o| {
                o.status == DocumentStatus::Accepted
                    && o.period == period
                    && o.connection_group.entity_address() == entity_address
            })
            .cloned()
            .collect())
    }

    async fn accepted_flex_offers(
        &self,
        entity_address: &str,
        period: NaiveDate,
    ) -> Result<Vec<FlexOffer>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .flex_offers
            .iter()
            .filter(|o| {
                o.status == DocumentStatus::Accepted
                    && o.period == period
                    && o.connection_group.entity_address() == entity_address
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "ean.12340001";

    fn period() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 6, 11).unwrap()
    }

    fn prognosis(index: u32, sequence: i64, status: DocumentStatus) -> PtuPrognosis {
        PtuPrognosis {
            connection_group: ConnectionGroup::congestion_point(ADDRESS),
            ptu: PtuId::new(period(), index, 96).unwrap(),
            sequence,
            participant_domain: "agr.usef-example.com".into(),
            prognosis_type: PrognosisType::DPrognosis,
            status,
            power: 10,
        }
    }

    #[tokio::test]
    async fn test_latest_accepted_prognosis_wins() {
        let repo = InMemoryPlanboard::new(15);
        repo.insert_prognosis(prognosis(1, 100, DocumentStatus::Accepted));
        repo.insert_prognosis(prognosis(1, 200, DocumentStatus::Accepted));
        repo.insert_prognosis(prognosis(1, 300, DocumentStatus::Rejected));
        repo.insert_prognosis(prognosis(2, 150, DocumentStatus::Accepted));

        let rows = repo.last_d_prognoses(period(), ADDRESS).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ptu.index(), 1);
        assert_eq!(rows[0].sequence, 200);
        assert_eq!(rows[1].ptu.index(), 2);
    }

    #[tokio::test]
    async fn test_last_grid_safety_analysis_returns_newest_run() {
        let repo = InMemoryPlanboard::new(15);
        let row = |sequence: i64| GridSafetyAnalysis {
            connection_group: ConnectionGroup::congestion_point(ADDRESS),
            ptu: PtuId::new(period(), 1, 96).unwrap(),
            power: 10,
            disposition: crate::domain::Disposition::Requested,
            sequence,
            prognosis_sequences: vec![],
        };
        repo.store_grid_safety_analysis(vec![row(1)]).await.unwrap();
        repo.store_grid_safety_analysis(vec![row(2)]).await.unwrap();

        let latest = repo.last_grid_safety_analysis(ADDRESS, period()).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].sequence, 2);
        // Older rows stay behind for audit.
        assert_eq!(repo.analyses_for(ADDRESS, period()).len(), 2);
    }

    #[tokio::test]
    async fn test_accepted_flex_orders_feed_settlement() {
        let repo = InMemoryPlanboard::new(15);
        let group = ConnectionGroup::congestion_point(ADDRESS);
        repo.insert_flex_order(FlexOrder {
            connection_group: group.clone(),
            period: period(),
            sequence: 1,
            participant_domain: "agr.usef-example.com".into(),
            status: DocumentStatus::Accepted,
            ptu_powers: vec![100, -200],
        });
        repo.insert_flex_order(FlexOrder {
            connection_group: group.clone(),
            period: period(),
            sequence: 2,
            participant_domain: "agr.usef-example.com".into(),
            status: DocumentStatus::Rejected,
            ptu_powers: vec![999, 999],
        });
        repo.insert_flex_offer(FlexOffer {
            connection_group: group.clone(),
            period: period(),
            sequence: 3,
            participant_domain: "agr.usef-example.com".into(),
            status: DocumentStatus::Accepted,
            ptu_powers: vec![100, -200],
        });

        let orders = repo.accepted_flex_orders(ADDRESS, period()).await.unwrap();
        assert_eq!(orders.len(), 1);
        let totals = crate::settlement::ordered_power_per_ptu(&orders, 2);
        assert_eq!(totals, vec![100, -200]);

        let offers = repo.accepted_flex_offers(ADDRESS, period()).await.unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].sequence, 3);
    }

    #[tokio::test]
    async fn test_find_or_create_ptu_state() {
        let repo = InMemoryPlanboard::new(15);
        let group = ConnectionGroup::congestion_point(ADDRESS);
        let ptu = PtuId::new(period(), 5, 96).unwrap();

        let state = repo.find_or_create_ptu_state(ptu, &group).await.unwrap();
        assert_eq!(state.regime, crate::domain::Regime::Green);

        let mut updated = state;
        updated.set_regime(crate::domain::Regime::Yellow);
        repo.save_ptu_state(updated).await.unwrap();

        let reread = repo.find_or_create_ptu_state(ptu, &group).await.unwrap();
        assert_eq!(reread.regime, crate::domain::Regime::Yellow);
    }
}
