use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inbound trigger: run a grid-safety analysis for one congestion point and
/// trading day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSafetyAnalysisEvent {
    pub entity_address: String,
    pub period: NaiveDate,
}

impl GridSafetyAnalysisEvent {
    pub fn new(entity_address: impl Into<String>, period: NaiveDate) -> Self {
        Self { entity_address: entity_address.into(), period }
    }
}

/// Follow-up: request flexibility from active aggregators for the PTUs the
/// analysis marked as requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFlexRequestEvent {
    pub entity_address: String,
    pub period: NaiveDate,
    /// 1-based indexes of the PTUs needing flexibility.
    pub requested_ptu_indexes: Vec<u32>,
}

/// Follow-up when no aggregator can respond: notify connections through the
/// coloring process instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoringProcessEvent {
    pub entity_address: String,
    pub period: NaiveDate,
}

/// Outbound messages from coordinators, delivered over an explicit channel
/// so ordering and delivery are observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    CreateFlexRequest(CreateFlexRequestEvent),
    ColoringProcess(ColoringProcessEvent),
}
