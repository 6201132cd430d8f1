use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ptu: PtuConfig,
    pub gate_closure: GateClosureConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PtuConfig {
    /// PTU length in minutes; must divide a 1440-minute day evenly.
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateClosureConfig {
    /// Time of day at which the day-ahead gate closes, "HH:MM".
    pub time: String,
    /// Number of PTUs by which the boundary is moved earlier.
    pub ptus: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GRIDFLEX__").split("__"));
        Ok(figment.extract()?)
    }

    /// Typed gate-closure view consumed by the coordinators.
    pub fn gate_closure(&self) -> Result<GateClosure> {
        let time = NaiveTime::parse_from_str(&self.gate_closure.time, "%H:%M")
            .with_context(|| format!("invalid gate closure time '{}'", self.gate_closure.time))?;
        Ok(GateClosure {
            time,
            ptus: self.gate_closure.ptus,
            ptu_duration_minutes: self.ptu.duration_minutes,
        })
    }
}

/// Day-ahead gate-closure parameters.
///
/// The gate for trading day D closes on D-1 at `time`, moved earlier by
/// `ptus * ptu_duration_minutes` minutes to leave room for processing the
/// final PTUs before the boundary.
#[derive(Debug, Clone, Copy)]
pub struct GateClosure {
    pub time: NaiveTime,
    pub ptus: u32,
    pub ptu_duration_minutes: u32,
}

impl GateClosure {
    /// Earliest trading day still open for fresh analysis at wall-clock `now`.
    ///
    /// Before the (moved) boundary the next day is still open; after it the
    /// horizon shifts one day further out.
    pub fn first_open_period(&self, now: DateTime<Utc>) -> NaiveDate {
        let boundary = self.time - Duration::minutes(i64::from(self.ptus * self.ptu_duration_minutes));
        let today = now.date_naive();
        if now.time() < boundary {
            today + Duration::days(1)
        } else {
            today + Duration::days(2)
        }
    }
}
