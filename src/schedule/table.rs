//! Period-indexed schedule tables and their derived totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::types::*;

/// Label reserved for the synthetic aggregate row
pub const TOTAL_ROW_LABEL: &str = "TOTAL";

/// Coerce free-form cell text into an amount
///
/// Accepts plain decimals (`1234.56`) and comma-decimal text with dot
/// thousands separators (`1.234,56`). Anything else, including empty text,
/// is 0.
pub fn coerce_amount(text: &str) -> BigDecimal {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return BigDecimal::from(0);
    }

    if let Ok(amount) = BigDecimal::from_str(trimmed) {
        return amount;
    }

    if trimmed.contains(',') {
        let normalized = trimmed.replace('.', "").replace(',', ".");
        if let Ok(amount) = BigDecimal::from_str(&normalized) {
            return amount;
        }
    }

    BigDecimal::from(0)
}

/// A single budget line within a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Name, unique within its table
    pub name: String,
    /// Amount per period; index 0 holds period 1
    pub values: Vec<BigDecimal>,
    /// Sum of `values`
    pub row_total: BigDecimal,
    /// Target the row is measured against. Equals `row_total` on plan rows.
    pub planned_total: BigDecimal,
    /// `row_total / planned_total`, measurement rows only
    pub percent_of_row_total: Option<Percent>,
}

impl LineItem {
    /// Create a plan row from its per-period values
    pub fn new(name: String, values: Vec<BigDecimal>) -> Self {
        let row_total: BigDecimal = values.iter().sum();
        Self {
            name,
            values,
            planned_total: row_total.clone(),
            row_total,
            percent_of_row_total: None,
        }
    }

    /// Amount for a 1-based period, 0 outside the row
    pub fn value(&self, period: u32) -> BigDecimal {
        period
            .checked_sub(1)
            .and_then(|index| self.values.get(index as usize))
            .cloned()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    fn recompute(&mut self, role: TableRole) {
        self.row_total = self.values.iter().sum();
        match role {
            TableRole::Plan => {
                self.planned_total = self.row_total.clone();
                self.percent_of_row_total = None;
            }
            TableRole::Measurement => {
                self.percent_of_row_total =
                    Some(Percent::ratio(&self.row_total, &self.planned_total));
            }
        }
    }
}

/// Column-wise aggregate of every line item in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalRow {
    pub values: Vec<BigDecimal>,
    pub row_total: BigDecimal,
    pub planned_total: BigDecimal,
    pub percent_of_row_total: Option<Percent>,
}

impl TotalRow {
    /// Aggregate amount for a 1-based period
    pub fn value(&self, period: u32) -> BigDecimal {
        period
            .checked_sub(1)
            .and_then(|index| self.values.get(index as usize))
            .cloned()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    fn same_amounts(&self, other: &TotalRow) -> bool {
        self.values == other.values
            && self.row_total == other.row_total
            && self.planned_total == other.planned_total
    }
}

/// A rectangular table of amounts: line items by periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTable {
    role: TableRole,
    period_count: u32,
    rows: Vec<LineItem>,
    /// `None` until the table is recomputed, and again after any edit
    totals: Option<TotalRow>,
}

impl ScheduleTable {
    /// Build a plan table; rows shorter than `period_count` are padded with 0
    pub fn create_from<I, N>(rows: I, period_count: u32) -> TrackerResult<Self>
    where
        I: IntoIterator<Item = (N, Vec<BigDecimal>)>,
        N: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|(name, values)| LineItem::new(name.into(), values))
            .collect();
        Self::from_parts(TableRole::Plan, period_count, rows)
    }

    /// Build a table of either role from prepared rows
    pub(crate) fn from_parts(
        role: TableRole,
        period_count: u32,
        rows: Vec<LineItem>,
    ) -> TrackerResult<Self> {
        if period_count == 0 {
            return Err(TrackerError::InvalidScheduleState(
                "A schedule needs at least one period".to_string(),
            ));
        }

        validate_rows(&rows)?;

        let mut table = Self {
            role,
            period_count,
            rows,
            totals: None,
        };
        table.prepare_for_save()?;
        Ok(table)
    }

    /// Derive an all-zero measurement table from a plan
    ///
    /// Row names and period count match the plan; each row's planned total
    /// is copied over as the target to measure against.
    pub fn derive_measurement_skeleton(plan: &ScheduleTable) -> TrackerResult<Self> {
        if plan.role != TableRole::Plan {
            return Err(TrackerError::InvalidScheduleState(
                "Measurement skeleton must be derived from a plan table".to_string(),
            ));
        }

        let rows = plan
            .rows
            .iter()
            .map(|row| LineItem {
                name: row.name.clone(),
                values: vec![BigDecimal::from(0); plan.period_count as usize],
                row_total: BigDecimal::from(0),
                planned_total: row.row_total.clone(),
                percent_of_row_total: None,
            })
            .collect();

        Self::from_parts(TableRole::Measurement, plan.period_count, rows)
    }

    pub fn role(&self) -> TableRole {
        self.role
    }

    pub fn period_count(&self) -> u32 {
        self.period_count
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    /// Look up a line item by name
    pub fn row(&self, name: &str) -> Option<&LineItem> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Amount for an item and period; 0 if either is absent
    pub fn value(&self, item: &str, period: u32) -> BigDecimal {
        self.row(item)
            .map(|row| row.value(period))
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Sum of every line item's `row_total`
    pub fn contract_total(&self) -> BigDecimal {
        self.rows.iter().map(|row| &row.row_total).sum()
    }

    /// Stored totals row, if the table has been recomputed since its last edit
    pub fn totals(&self) -> Option<&TotalRow> {
        self.totals.as_ref()
    }

    /// Stored totals row, verified against the current line items
    ///
    /// Only the amounts are compared. Percentages are persisted at display
    /// precision and are always re-derived from the amounts.
    pub fn checked_totals(&self) -> TrackerResult<&TotalRow> {
        match &self.totals {
            Some(totals) if totals.same_amounts(&self.compute_totals()) => Ok(totals),
            _ => Err(TrackerError::MissingTotalsRow(self.role)),
        }
    }

    /// Set one cell. Invalidates the totals row.
    pub fn set_value(&mut self, item: &str, period: u32, amount: BigDecimal) -> TrackerResult<()> {
        self.ensure_period(period)?;
        let index = (period - 1) as usize;
        let period_count = self.period_count as usize;
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.name == item)
            .ok_or_else(|| {
                TrackerError::InvalidScheduleState(format!("Unknown line item '{}'", item))
            })?;

        if row.values.len() < period_count {
            row.values.resize(period_count, BigDecimal::from(0));
        }
        row.values[index] = amount;
        self.totals = None;
        Ok(())
    }

    /// Set one cell from user-entered text; unparseable text becomes 0
    pub fn set_value_text(&mut self, item: &str, period: u32, text: &str) -> TrackerResult<()> {
        self.set_value(item, period, coerce_amount(text))
    }

    /// Append zero-valued periods up to `new_period_count`
    pub fn extend_periods(&mut self, new_period_count: u32) -> TrackerResult<()> {
        if new_period_count <= self.period_count {
            return Err(TrackerError::InvalidScheduleState(format!(
                "Cannot extend {} table from {} to {} periods",
                self.role, self.period_count, new_period_count
            )));
        }

        for row in &mut self.rows {
            row.values
                .resize(new_period_count as usize, BigDecimal::from(0));
        }
        self.period_count = new_period_count;
        self.totals = None;
        Ok(())
    }

    /// Recalculate row totals, measurement percentages and the totals row
    pub fn recompute_totals(&mut self) {
        for row in &mut self.rows {
            row.recompute(self.role);
        }
        self.totals = Some(self.compute_totals());
    }

    /// Enforce the row shape and rebuild every derived field
    ///
    /// Short rows are padded with 0; rows longer than the schedule are
    /// rejected without touching the table.
    pub fn prepare_for_save(&mut self) -> TrackerResult<()> {
        let period_count = self.period_count as usize;
        if let Some(row) = self.rows.iter().find(|row| row.values.len() > period_count) {
            return Err(TrackerError::InvalidScheduleState(format!(
                "Line item '{}' has {} values but the schedule has {} periods",
                row.name,
                row.values.len(),
                period_count
            )));
        }

        for row in &mut self.rows {
            row.values.resize(period_count, BigDecimal::from(0));
        }
        self.recompute_totals();
        Ok(())
    }

    /// Copy each plan row total into the matching measurement target
    pub fn retarget_from(&mut self, plan: &ScheduleTable) -> TrackerResult<()> {
        if self.role != TableRole::Measurement || plan.role != TableRole::Plan {
            return Err(TrackerError::InvalidScheduleState(
                "Targets can only be copied from a plan into a measurement".to_string(),
            ));
        }

        for row in &mut self.rows {
            row.planned_total = plan
                .row(&row.name)
                .map(|planned| planned.row_total.clone())
                .unwrap_or_else(|| BigDecimal::from(0));
        }
        self.totals = None;
        Ok(())
    }

    fn ensure_period(&self, period: u32) -> TrackerResult<()> {
        if period == 0 || period > self.period_count {
            return Err(TrackerError::MissingPeriod {
                period,
                period_count: self.period_count,
            });
        }
        Ok(())
    }

    fn compute_totals(&self) -> TotalRow {
        let values: Vec<BigDecimal> = (1..=self.period_count)
            .map(|period| self.rows.iter().map(|row| row.value(period)).sum::<BigDecimal>())
            .collect();
        let row_total: BigDecimal = self
            .rows
            .iter()
            .map(|row| row.values.iter().sum::<BigDecimal>())
            .sum();
        let planned_total: BigDecimal = match self.role {
            TableRole::Plan => row_total.clone(),
            TableRole::Measurement => self.rows.iter().map(|row| &row.planned_total).sum(),
        };
        let percent_of_row_total = match self.role {
            TableRole::Plan => None,
            TableRole::Measurement => Some(Percent::ratio(&row_total, &planned_total)),
        };

        TotalRow {
            values,
            row_total,
            planned_total,
            percent_of_row_total,
        }
    }
}

fn validate_rows(rows: &[LineItem]) -> TrackerResult<()> {
    let mut seen = HashSet::new();
    for row in rows {
        let name = row.name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidScheduleState(
                "Line item name cannot be empty".to_string(),
            ));
        }
        if name.eq_ignore_ascii_case(TOTAL_ROW_LABEL) {
            return Err(TrackerError::InvalidScheduleState(format!(
                "'{}' is reserved for the totals row",
                row.name
            )));
        }
        if !seen.insert(name) {
            return Err(TrackerError::InvalidScheduleState(format!(
                "Duplicate line item '{}'",
                row.name
            )));
        }
    }
    Ok(())
}
