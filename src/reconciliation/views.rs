//! Analytical views derived from a plan/measurement pair

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::Percent;

/// Each line item's share of the contract value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractShareRow {
    pub item: String,
    pub row_total: BigDecimal,
    pub percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageOfContract {
    pub contract_total: BigDecimal,
    pub rows: Vec<ContractShareRow>,
}

/// Planned vs realized amount for one line item in a single period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPeriodRow {
    pub item: String,
    pub row_total: BigDecimal,
    pub planned_at_current: BigDecimal,
    pub percent_planned: Percent,
    pub realized_at_current: BigDecimal,
    pub percent_realized: Percent,
    /// `percent_realized - percent_planned`
    pub deviation: Percent,
}

/// Single-period comparison at the current period
///
/// Reads only period `current_period`, not the running total up to it; see
/// [`CumulativeSeries`] for progress to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeComparison {
    pub current_period: u32,
    pub rows: Vec<CurrentPeriodRow>,
}

/// Aggregate planned vs realized for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparisonRow {
    pub period: u32,
    pub total_planned: BigDecimal,
    pub percent_planned: Percent,
    pub total_realized: BigDecimal,
    pub percent_realized: Percent,
    pub deviation_amount: BigDecimal,
    pub deviation_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodByPeriodComparison {
    pub contract_total: BigDecimal,
    pub rows: Vec<PeriodComparisonRow>,
}

/// Denominator used for contractual balance percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceBasis {
    /// Percentages of the whole contract value
    ProjectWide,
    /// Percentages of each item's own planned total
    PerItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub item: String,
    pub planned_total: BigDecimal,
    pub realized: BigDecimal,
    pub percent_realized: Percent,
    /// Planned total minus realized
    pub balance: BigDecimal,
    pub percent_balance: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractualBalance {
    pub basis: BalanceBasis,
    pub contract_total: BigDecimal,
    pub rows: Vec<BalanceRow>,
}

/// Progress to date for one line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesItem {
    pub item: String,
    pub row_total: BigDecimal,
    /// Running planned sum, one entry per period `1..=upto_period`
    pub planned_running: Vec<BigDecimal>,
    /// Running realized sum, one entry per period `1..=upto_period`
    pub realized_running: Vec<BigDecimal>,
    pub planned_to_date: BigDecimal,
    pub realized_to_date: BigDecimal,
    pub percent_planned: Percent,
    pub percent_realized: Percent,
    pub deviation: Percent,
}

/// One point of the aggregate progress curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub period: u32,
    pub planned: BigDecimal,
    pub realized: BigDecimal,
    pub planned_cumulative: BigDecimal,
    pub realized_cumulative: BigDecimal,
    pub percent_planned_cumulative: Percent,
    pub percent_realized_cumulative: Percent,
}

/// Running sums over periods `1..=upto_period`, per item and in total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    pub upto_period: u32,
    pub contract_total: BigDecimal,
    pub items: Vec<SeriesItem>,
    pub curve: Vec<CurvePoint>,
}

impl CumulativeSeries {
    /// Last point of the curve, the contract-wide progress to date
    pub fn to_date(&self) -> Option<&CurvePoint> {
        self.curve.last()
    }
}
