//! Conversion between schedule tables and loosely-typed column records
//!
//! Document stores keep a schedule as a list of flat records keyed by column
//! name. Export always emits the columns in the order
//! `[Item, Row Total, Period 1..Period N, Total, Percent of Total]` and ends
//! with the totals row; import is forgiving about cell contents.

use bigdecimal::BigDecimal;
use serde_json::{Map, Value};

use super::table::{coerce_amount, LineItem, ScheduleTable, TOTAL_ROW_LABEL};
use crate::config::DEFAULT_MAX_PERIOD_COUNT;
use crate::types::*;

pub const ITEM_COLUMN: &str = "Item";
pub const ROW_TOTAL_COLUMN: &str = "Row Total";
pub const TOTAL_COLUMN: &str = "Total";
pub const PERCENT_COLUMN: &str = "Percent of Total";

const PERIOD_PREFIX: &str = "Period ";

/// A flat record as stored by a document database
pub type Record = Map<String, Value>;

/// Column name for a 1-based period
pub fn period_column(period: u32) -> String {
    format!("{}{}", PERIOD_PREFIX, period)
}

/// Full column list for a schedule of `period_count` periods
pub fn column_order(period_count: u32) -> Vec<String> {
    let mut columns = vec![ITEM_COLUMN.to_string(), ROW_TOTAL_COLUMN.to_string()];
    columns.extend((1..=period_count).map(period_column));
    columns.push(TOTAL_COLUMN.to_string());
    columns.push(PERCENT_COLUMN.to_string());
    columns
}

fn parse_period_column(column: &str) -> Option<u32> {
    column
        .strip_prefix(PERIOD_PREFIX)
        .and_then(|n| n.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Coerce a JSON cell into an amount; anything non-numeric is 0
pub fn coerce_value(value: &Value) -> BigDecimal {
    match value {
        Value::Number(number) => coerce_amount(&number.to_string()),
        Value::String(text) => coerce_amount(text),
        _ => BigDecimal::from(0),
    }
}

fn amount_cell(amount: &BigDecimal) -> Value {
    Value::String(amount.to_string())
}

impl ScheduleTable {
    /// Export every line item followed by the totals row
    pub fn to_records(&self) -> Vec<Record> {
        let contract_total = self.contract_total();
        let mut records: Vec<Record> = self
            .rows()
            .iter()
            .map(|row| {
                let percent = match (&row.percent_of_row_total, self.role()) {
                    (Some(percent), _) => percent.clone(),
                    (None, TableRole::Plan) => Percent::ratio(&row.row_total, &contract_total),
                    (None, TableRole::Measurement) => {
                        Percent::ratio(&row.row_total, &row.planned_total)
                    }
                };
                self.record(&row.name, &row.planned_total, &row.values, &row.row_total, &percent)
            })
            .collect();

        let values: Vec<BigDecimal> = (1..=self.period_count())
            .map(|period| self.rows().iter().map(|row| row.value(period)).sum::<BigDecimal>())
            .collect();
        let row_total: BigDecimal = self.rows().iter().map(|row| &row.row_total).sum();
        let planned_total: BigDecimal = self.rows().iter().map(|row| &row.planned_total).sum();
        let percent = match self.role() {
            TableRole::Plan => Percent::ratio(&row_total, &contract_total),
            TableRole::Measurement => Percent::ratio(&row_total, &planned_total),
        };
        records.push(self.record(TOTAL_ROW_LABEL, &planned_total, &values, &row_total, &percent));
        records
    }

    fn record(
        &self,
        item: &str,
        planned_total: &BigDecimal,
        values: &[BigDecimal],
        row_total: &BigDecimal,
        percent: &Percent,
    ) -> Record {
        let mut record = Record::new();
        record.insert(ITEM_COLUMN.to_string(), Value::String(item.to_string()));
        record.insert(ROW_TOTAL_COLUMN.to_string(), amount_cell(planned_total));
        for period in 1..=self.period_count() {
            let amount = values
                .get((period - 1) as usize)
                .cloned()
                .unwrap_or_else(|| BigDecimal::from(0));
            record.insert(period_column(period), amount_cell(&amount));
        }
        record.insert(TOTAL_COLUMN.to_string(), amount_cell(row_total));
        record.insert(PERCENT_COLUMN.to_string(), Value::String(percent.to_string()));
        record
    }

    /// Rebuild a table from stored records
    ///
    /// A row labelled `TOTAL` is dropped and recomputed. When `period_count`
    /// is `None` it is taken from the highest `Period N` column present.
    /// Measurement rows read their target from the `Row Total` column.
    /// Schedules longer than `DEFAULT_MAX_PERIOD_COUNT` are rejected.
    pub fn from_records(
        role: TableRole,
        records: &[Record],
        period_count: Option<u32>,
    ) -> TrackerResult<Self> {
        Self::from_records_with_limit(role, records, period_count, DEFAULT_MAX_PERIOD_COUNT)
    }

    /// Same as `from_records` with an explicit upper bound on the period count
    pub fn from_records_with_limit(
        role: TableRole,
        records: &[Record],
        period_count: Option<u32>,
        max_period_count: u32,
    ) -> TrackerResult<Self> {
        let detected = records
            .iter()
            .flat_map(|record| record.keys())
            .filter_map(|column| parse_period_column(column))
            .max();
        let period_count = period_count.or(detected).ok_or_else(|| {
            TrackerError::InvalidScheduleState(
                "Records carry no period columns and no period count was given".to_string(),
            )
        })?;
        if period_count > max_period_count {
            return Err(TrackerError::InvalidScheduleState(format!(
                "Records describe {} periods, more than the maximum of {}",
                period_count, max_period_count
            )));
        }

        let mut rows = Vec::new();
        for record in records {
            let name = match record.get(ITEM_COLUMN) {
                Some(Value::String(name)) => name.trim().to_string(),
                Some(Value::Number(number)) => number.to_string(),
                _ => {
                    return Err(TrackerError::Record(format!(
                        "Record without an '{}' column",
                        ITEM_COLUMN
                    )))
                }
            };
            if name.eq_ignore_ascii_case(TOTAL_ROW_LABEL) {
                continue;
            }

            let mut values = vec![BigDecimal::from(0); period_count as usize];
            for (column, cell) in record {
                if let Some(period) = parse_period_column(column) {
                    if period > period_count {
                        return Err(TrackerError::InvalidScheduleState(format!(
                            "Line item '{}' has a value for period {} but the schedule has {} periods",
                            name, period, period_count
                        )));
                    }
                    values[(period - 1) as usize] = coerce_value(cell);
                }
            }

            let mut row = LineItem::new(name, values);
            if role == TableRole::Measurement {
                row.planned_total = record
                    .get(ROW_TOTAL_COLUMN)
                    .map(coerce_value)
                    .unwrap_or_else(|| BigDecimal::from(0));
            }
            rows.push(row);
        }

        Self::from_parts(role, period_count, rows)
    }
}
