//! Core types and data structures for contract progress tracking

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use crate::schedule::ScheduleTable;

/// Role a schedule table plays within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableRole {
    /// The originally agreed disbursement schedule
    Plan,
    /// Amounts actually realized per period
    Measurement,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Plan => write!(f, "plan"),
            TableRole::Measurement => write!(f, "measurement"),
        }
    }
}

/// A percentage kept at full precision and displayed as `"X.XX%"`
///
/// Serialized as its display string so report consumers receive the same
/// text the tables show.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(BigDecimal);

impl Percent {
    /// 0%
    pub fn zero() -> Self {
        Self(BigDecimal::from(0))
    }

    /// Wrap an already scaled percentage (e.g. `12.5` for 12.5%)
    pub fn new(value: BigDecimal) -> Self {
        Self(value)
    }

    /// `part / whole * 100`, or 0% when `whole` is zero
    pub fn ratio(part: &BigDecimal, whole: &BigDecimal) -> Self {
        if *whole == BigDecimal::from(0) {
            return Self::zero();
        }
        Self((part * BigDecimal::from(100)) / whole)
    }

    /// Unrounded value
    pub fn value(&self) -> &BigDecimal {
        &self.0
    }

    /// Value rounded to two decimal places
    pub fn rounded(&self) -> BigDecimal {
        self.0.round(2).with_scale(2)
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}

impl Sub for &Percent {
    type Output = Percent;

    fn sub(self, rhs: &Percent) -> Percent {
        Percent(&self.0 - &rhs.0)
    }
}

impl FromStr for Percent {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        BigDecimal::from_str(number)
            .map(Percent)
            .map_err(|_| TrackerError::Record(format!("Invalid percentage: '{}'", s)))
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Scalar contract metadata entered at registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    /// Contract number, unique across projects
    pub contract_number: String,
    /// Party that hired the work
    pub contracting_party: String,
    /// Company executing the work
    pub contractor: String,
    /// Description of the contracted object
    pub object: String,
    /// Service order / purchase order reference
    pub service_order: Option<String>,
    /// First day the contract is in force
    pub validity_start: Option<NaiveDate>,
    /// Last day the contract is in force
    pub validity_end: Option<NaiveDate>,
    /// Monetary value of goods/services received so far
    pub value_received: BigDecimal,
}

impl ProjectDetails {
    /// Create details with the required fields, leaving the rest empty
    pub fn new(
        contract_number: String,
        contracting_party: String,
        contractor: String,
        object: String,
    ) -> Self {
        Self {
            contract_number,
            contracting_party,
            contractor,
            object,
            service_order: None,
            validity_start: None,
            validity_end: None,
            value_received: BigDecimal::from(0),
        }
    }
}

/// A tracked contract: metadata plus its plan and measurement schedules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Store key
    pub id: String,
    pub details: ProjectDetails,
    /// Planned disbursement schedule
    pub plan: ScheduleTable,
    /// Realized amounts, same rows and periods as `plan`
    pub measurement: ScheduleTable,
    /// Most recently measured period, 1-based
    pub current_period: u32,
    /// Optimistic concurrency counter, bumped by the store on every save
    pub version: u64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Project {
    /// Assemble a new project around a plan, deriving its measurement skeleton
    pub fn new(details: ProjectDetails, plan: ScheduleTable) -> TrackerResult<Self> {
        let measurement = ScheduleTable::derive_measurement_skeleton(&plan)?;
        let now = chrono::Utc::now().naive_utc();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            details,
            plan,
            measurement,
            current_period: 1,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Contract duration in periods
    pub fn period_count(&self) -> u32 {
        self.plan.period_count()
    }

    /// Grow both schedules to `new_period_count`, or neither
    pub fn extend_periods(&mut self, new_period_count: u32) -> TrackerResult<()> {
        self.validate_shape()?;
        let mut plan = self.plan.clone();
        let mut measurement = self.measurement.clone();
        plan.extend_periods(new_period_count)?;
        measurement.extend_periods(new_period_count)?;
        self.plan = plan;
        self.measurement = measurement;
        Ok(())
    }

    /// Move the current period forward; earlier periods never move it back
    pub fn advance_to(&mut self, period: u32) {
        self.current_period = self.current_period.max(period);
    }

    /// Check that plan and measurement describe the same schedule shape
    pub fn validate_shape(&self) -> TrackerResult<()> {
        if self.plan.role() != TableRole::Plan {
            return Err(TrackerError::InvalidScheduleState(
                "Project plan table does not have the plan role".to_string(),
            ));
        }
        if self.measurement.role() != TableRole::Measurement {
            return Err(TrackerError::InvalidScheduleState(
                "Project measurement table does not have the measurement role".to_string(),
            ));
        }
        if self.plan.period_count() != self.measurement.period_count() {
            return Err(TrackerError::InvalidScheduleState(format!(
                "Plan has {} periods but measurement has {}",
                self.plan.period_count(),
                self.measurement.period_count()
            )));
        }
        if self.current_period == 0 || self.current_period > self.period_count() {
            return Err(TrackerError::MissingPeriod {
                period: self.current_period,
                period_count: self.period_count(),
            });
        }
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Errors that can occur while tracking projects and reconciling schedules
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid schedule state: {0}")]
    InvalidScheduleState(String),
    #[error("Period {period} is out of range (schedule has {period_count} periods)")]
    MissingPeriod { period: u32, period_count: u32 },
    #[error("Totals row of the {0} table is missing or stale")]
    MissingTotalsRow(TableRole),
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
    #[error("Project already exists: {0}")]
    DuplicateProject(String),
    #[error("Version conflict on project {id}: expected {expected}, found {found}")]
    VersionConflict { id: String, expected: u64, found: u64 },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Record error: {0}")]
    Record(String),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_ratio_and_display() {
        let percent = Percent::ratio(&BigDecimal::from(80), &BigDecimal::from(1000));
        assert_eq!(percent.to_string(), "8.00%");

        let third = Percent::ratio(&BigDecimal::from(1), &BigDecimal::from(3));
        assert_eq!(third.to_string(), "33.33%");
    }

    #[test]
    fn test_percent_zero_denominator() {
        let percent = Percent::ratio(&BigDecimal::from(500), &BigDecimal::from(0));
        assert_eq!(percent, Percent::zero());
        assert_eq!(percent.to_string(), "0.00%");
    }

    #[test]
    fn test_percent_difference_is_negative() {
        let realized = Percent::new(BigDecimal::from(8));
        let planned = Percent::new(BigDecimal::from(10));
        assert_eq!((&realized - &planned).to_string(), "-2.00%");
    }

    #[test]
    fn test_percent_parse() {
        let percent: Percent = "12.50%".parse().unwrap();
        assert_eq!(percent.rounded(), BigDecimal::from_str("12.50").unwrap());
        assert!("abc%".parse::<Percent>().is_err());
    }

    #[test]
    fn test_percent_serializes_as_text() {
        let percent = Percent::new(BigDecimal::from(12));
        let json = serde_json::to_string(&percent).unwrap();
        assert_eq!(json, "\"12.00%\"");
        let back: Percent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, percent);
    }
}
