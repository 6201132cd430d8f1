//! Planboard records exchanged between market roles: prognoses, forecasts,
//! flex offers/orders, grid-safety analysis rows and per-PTU state.
//!
//! All power quantities are whole-unit `i64` values; settlement and safety
//! classification never touch floating point.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::connection_group::ConnectionGroup;
use super::time_slice::PtuId;

/// Classification of a PTU by the grid-safety computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposition {
    /// No grid constraint on this PTU.
    Available,
    /// Flexibility is needed on this PTU.
    Requested,
}

/// Safety color derived per PTU by the grid-safety coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PrognosisType {
    /// Aggregator plan towards the balance responsible party.
    APlan,
    /// Day-ahead prognosis towards the grid operator.
    DPrognosis,
}

/// Lifecycle status of an exchanged planboard document. At most one document
/// of a given type is `Accepted` per (connection group, period, PTU);
/// superseded documents stay on the planboard for audit but drop out of
/// active computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Accepted,
    Superseded,
    Rejected,
}

/// One PTU of a prognosis document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtuPrognosis {
    pub connection_group: ConnectionGroup,
    pub ptu: PtuId,
    pub sequence: i64,
    pub participant_domain: String,
    pub prognosis_type: PrognosisType,
    pub status: DocumentStatus,
    pub power: i64,
}

/// Latest known forecast for connections not represented by any aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonAggregatorForecast {
    pub connection_group: ConnectionGroup,
    pub ptu: PtuId,
    pub sequence: i64,
    pub power: i64,
    pub max_load: i64,
}

/// A flexibility offer from an aggregator, one power value per PTU of the
/// period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexOffer {
    pub connection_group: ConnectionGroup,
    pub period: NaiveDate,
    pub sequence: i64,
    pub participant_domain: String,
    pub status: DocumentStatus,
    pub ptu_powers: Vec<i64>,
}

/// An accepted-or-not flexibility order placed against an offer, one ordered
/// power value per PTU of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexOrder {
    pub connection_group: ConnectionGroup,
    pub period: NaiveDate,
    pub sequence: i64,
    pub participant_domain: String,
    pub status: DocumentStatus,
    pub ptu_powers: Vec<i64>,
}

/// Result row of one grid-safety analysis run for one PTU. Append-only: a new
/// run writes new rows under a fresh sequence, it never edits prior rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSafetyAnalysis {
    pub connection_group: ConnectionGroup,
    pub ptu: PtuId,
    pub power: i64,
    pub disposition: Disposition,
    pub sequence: i64,
    /// Sequence numbers of the prognoses this analysis was computed from.
    pub prognosis_sequences: Vec<i64>,
}

/// Mutable per-(PTU, connection group) state carrying the safety regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtuState {
    pub ptu: PtuId,
    pub connection_group: ConnectionGroup,
    pub regime: Regime,
}

impl PtuState {
    /// Fresh state for a PTU that has not been classified yet.
    pub fn new(ptu: PtuId, connection_group: ConnectionGroup) -> Self {
        Self { ptu, connection_group, regime: Regime::Green }
    }

    pub fn set_regime(&mut self, regime: Regime) {
        self.regime = regime;
    }
}
