//! Delivered-flex and power-deficiency settlement.
//!
//! Pure integer arithmetic over whole-unit power values; each PTU is settled
//! independently and a period result is just the ordered sequence of its PTU
//! results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{ConnectionGroup, DocumentStatus, FlexOrder, PtuId};
use crate::error::WorkflowError;

/// Outcome of settling a single PTU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexDelivery {
    pub delivered_flex_power: i64,
    pub power_deficiency: i64,
}

/// Settle one PTU from its actual power, prognosis power and ordered flex
/// power.
///
/// The realized deviation only counts as delivered flexibility when it moved
/// in the ordered direction; a deviation the wrong way (or none at all)
/// leaves the full order as deficiency.
pub fn settle_ptu(actual_power: i64, prognosis_power: i64, ordered_flex_power: i64) -> FlexDelivery {
    let deviation = actual_power - prognosis_power;

    if ordered_flex_power == 0 {
        return FlexDelivery { delivered_flex_power: 0, power_deficiency: 0 };
    }

    if deviation == 0 || deviation.signum() != ordered_flex_power.signum() {
        return FlexDelivery {
            delivered_flex_power: 0,
            power_deficiency: ordered_flex_power.abs(),
        };
    }

    if deviation.abs() >= ordered_flex_power.abs() {
        // Order fully satisfied; surplus deviation is not credited.
        FlexDelivery { delivered_flex_power: ordered_flex_power, power_deficiency: 0 }
    } else {
        FlexDelivery {
            delivered_flex_power: deviation,
            power_deficiency: ordered_flex_power.abs() - deviation.abs(),
        }
    }
}

/// Per-PTU input to a period settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtuSettlementInput {
    pub actual_power: i64,
    pub prognosis_power: i64,
    pub ordered_flex_power: i64,
}

/// Settled figures for one PTU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexSettlement {
    pub ptu: PtuId,
    pub actual_power: i64,
    pub prognosis_power: i64,
    pub ordered_flex_power: i64,
    pub delivered_flex_power: i64,
    pub power_deficiency: i64,
}

/// Settlement over a date range for one connection group. Computed on
/// demand; never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub connection_group: ConnectionGroup,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub ptus: Vec<FlexSettlement>,
    pub total_delivered_flex_power: i64,
    pub total_power_deficiency: i64,
}

/// Settle every PTU of `from..=to` for one connection group.
///
/// `per_day` maps each date to its ordered PTU inputs; dates without data
/// contribute nothing. The range must be non-empty and well ordered.
pub fn settle_period(
    connection_group: ConnectionGroup,
    from: NaiveDate,
    to: NaiveDate,
    per_day: &BTreeMap<NaiveDate, Vec<PtuSettlementInput>>,
) -> Result<SettlementResult, WorkflowError> {
    if from > to {
        return Err(WorkflowError::Invariant(format!(
            "settlement range {from}..={to} is inverted"
        )));
    }

    let mut ptus = Vec::new();
    let mut total_delivered: i64 = 0;
    let mut total_deficiency: i64 = 0;

    let mut day = from;
    loop {
        if let Some(inputs) = per_day.get(&day) {
            let ptus_in_day = inputs.len() as u32;
            for (offset, input) in inputs.iter().enumerate() {
                let ptu = PtuId::new(day, offset as u32 + 1, ptus_in_day)?;
                let delivery =
                    settle_ptu(input.actual_power, input.prognosis_power, input.ordered_flex_power);

                total_delivered = total_delivered
                    .checked_add(delivery.delivered_flex_power)
                    .ok_or_else(|| {
                        WorkflowError::Invariant("delivered flex total overflowed".into())
                    })?;
                total_deficiency = total_deficiency
                    .checked_add(delivery.power_deficiency)
                    .ok_or_else(|| {
                        WorkflowError::Invariant("power deficiency total overflowed".into())
                    })?;

                ptus.push(FlexSettlement {
                    ptu,
                    actual_power: input.actual_power,
                    prognosis_power: input.prognosis_power,
                    ordered_flex_power: input.ordered_flex_power,
                    delivered_flex_power: delivery.delivered_flex_power,
                    power_deficiency: delivery.power_deficiency,
                });
            }
        }
        if day == to {
            break;
        }
        day = day.succ_opt().ok_or_else(|| {
            WorkflowError::Invariant(format!("settlement range ran past the calendar at {day}"))
        })?;
    }

    Ok(SettlementResult {
        connection_group,
        from,
        to,
        ptus,
        total_delivered_flex_power: total_delivered,
        total_power_deficiency: total_deficiency,
    })
}

/// Sum the accepted flex-order power per PTU index for one period.
///
/// Orders shorter than the day contribute only the PTUs they carry.
pub fn ordered_power_per_ptu(orders: &[FlexOrder], ptus_in_day: usize) -> Vec<i64> {
    let mut totals = vec![0i64; ptus_in_day];
    for order in orders.iter().filter(|o| o.status == DocumentStatus::Accepted) {
        for (slot, power) in totals.iter_mut().zip(&order.ptu_powers) {
            *slot += power;
        }
    }
    totals
}
