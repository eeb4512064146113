//! Planning-vs-measurement reconciliation
//!
//! Every view is re-derived from the two schedule tables on each call; the
//! engine keeps no state between calls and performs no I/O.
//!
//! Period convention: "current period" means period `current_period` itself,
//! and running sums cover `1..=current_period`.

pub mod views;

pub use views::*;

use bigdecimal::BigDecimal;

use crate::schedule::ScheduleTable;
use crate::types::*;

/// Derives analytical views from a plan and a measurement table
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Each plan item's share of the contract total
    pub fn percentage_of_contract(&self, plan: &ScheduleTable) -> TrackerResult<PercentageOfContract> {
        expect_role(plan, TableRole::Plan)?;
        let contract_total = plan.contract_total();

        let rows = plan
            .rows()
            .iter()
            .map(|row| ContractShareRow {
                item: row.name.clone(),
                row_total: row.row_total.clone(),
                percent: Percent::ratio(&row.row_total, &contract_total),
            })
            .collect();

        Ok(PercentageOfContract {
            contract_total,
            rows,
        })
    }

    /// Compare planned and realized amounts of the single period `current_period`
    pub fn cumulative_comparison(
        &self,
        plan: &ScheduleTable,
        measurement: &ScheduleTable,
        current_period: u32,
    ) -> TrackerResult<CumulativeComparison> {
        expect_pair(plan, measurement)?;
        ensure_period(plan, measurement, current_period)?;

        let rows = plan
            .rows()
            .iter()
            .map(|row| {
                let planned_at_current = row.value(current_period);
                let realized_at_current = measurement.value(&row.name, current_period);
                let percent_planned = Percent::ratio(&planned_at_current, &row.row_total);
                let percent_realized = Percent::ratio(&realized_at_current, &row.row_total);
                let deviation = &percent_realized - &percent_planned;

                CurrentPeriodRow {
                    item: row.name.clone(),
                    row_total: row.row_total.clone(),
                    planned_at_current,
                    percent_planned,
                    realized_at_current,
                    percent_realized,
                    deviation,
                }
            })
            .collect();

        Ok(CumulativeComparison {
            current_period,
            rows,
        })
    }

    /// Aggregate comparison for every period `1..=current_period`, read from
    /// the totals rows
    pub fn period_by_period_comparison(
        &self,
        plan: &ScheduleTable,
        measurement: &ScheduleTable,
        current_period: u32,
    ) -> TrackerResult<PeriodByPeriodComparison> {
        expect_pair(plan, measurement)?;
        let plan_totals = plan.checked_totals()?;
        let measurement_totals = measurement.checked_totals()?;
        ensure_period(plan, measurement, current_period)?;

        let contract_total = plan_totals.row_total.clone();
        let rows = (1..=current_period)
            .map(|period| {
                let total_planned = plan_totals.value(period);
                let total_realized = measurement_totals.value(period);
                let percent_planned = Percent::ratio(&total_planned, &contract_total);
                let percent_realized = Percent::ratio(&total_realized, &contract_total);
                let deviation_amount = &total_realized - &total_planned;
                let deviation_percent = &percent_realized - &percent_planned;

                PeriodComparisonRow {
                    period,
                    total_planned,
                    percent_planned,
                    total_realized,
                    percent_realized,
                    deviation_amount,
                    deviation_percent,
                }
            })
            .collect();

        Ok(PeriodByPeriodComparison {
            contract_total,
            rows,
        })
    }

    /// Planned total, realized total and remaining balance per item
    pub fn contractual_balance(
        &self,
        plan: &ScheduleTable,
        measurement: &ScheduleTable,
        basis: BalanceBasis,
    ) -> TrackerResult<ContractualBalance> {
        expect_pair(plan, measurement)?;
        let contract_total = plan.contract_total();

        let rows = plan
            .rows()
            .iter()
            .map(|row| {
                let realized = measurement
                    .row(&row.name)
                    .map(|measured| measured.row_total.clone())
                    .unwrap_or_else(|| BigDecimal::from(0));
                let balance = &row.row_total - &realized;
                let denominator = match basis {
                    BalanceBasis::ProjectWide => &contract_total,
                    BalanceBasis::PerItem => &row.row_total,
                };

                BalanceRow {
                    item: row.name.clone(),
                    planned_total: row.row_total.clone(),
                    percent_realized: Percent::ratio(&realized, denominator),
                    percent_balance: Percent::ratio(&balance, denominator),
                    realized,
                    balance,
                }
            })
            .collect();

        Ok(ContractualBalance {
            basis,
            contract_total,
            rows,
        })
    }

    /// Running planned and realized sums over periods `1..=upto_period`
    pub fn cumulative_series(
        &self,
        plan: &ScheduleTable,
        measurement: &ScheduleTable,
        upto_period: u32,
    ) -> TrackerResult<CumulativeSeries> {
        expect_pair(plan, measurement)?;
        ensure_period(plan, measurement, upto_period)?;
        let contract_total = plan.contract_total();

        let items = plan
            .rows()
            .iter()
            .map(|row| {
                let measured = measurement.row(&row.name);
                let planned_running = running_sums((1..=upto_period).map(|p| row.value(p)));
                let realized_running = running_sums((1..=upto_period).map(|p| {
                    measured
                        .map(|m| m.value(p))
                        .unwrap_or_else(|| BigDecimal::from(0))
                }));
                let planned_to_date = last_or_zero(&planned_running);
                let realized_to_date = last_or_zero(&realized_running);
                let percent_planned = Percent::ratio(&planned_to_date, &row.row_total);
                let percent_realized = Percent::ratio(&realized_to_date, &row.row_total);
                let deviation = &percent_realized - &percent_planned;

                SeriesItem {
                    item: row.name.clone(),
                    row_total: row.row_total.clone(),
                    planned_running,
                    realized_running,
                    planned_to_date,
                    realized_to_date,
                    percent_planned,
                    percent_realized,
                    deviation,
                }
            })
            .collect::<Vec<_>>();

        let mut planned_cumulative = BigDecimal::from(0);
        let mut realized_cumulative = BigDecimal::from(0);
        let curve = (1..=upto_period)
            .map(|period| {
                let planned: BigDecimal = plan.rows().iter().map(|row| row.value(period)).sum();
                let realized: BigDecimal = plan
                    .rows()
                    .iter()
                    .map(|row| measurement.value(&row.name, period))
                    .sum();
                planned_cumulative += &planned;
                realized_cumulative += &realized;

                CurvePoint {
                    period,
                    percent_planned_cumulative: Percent::ratio(&planned_cumulative, &contract_total),
                    percent_realized_cumulative: Percent::ratio(
                        &realized_cumulative,
                        &contract_total,
                    ),
                    planned,
                    realized,
                    planned_cumulative: planned_cumulative.clone(),
                    realized_cumulative: realized_cumulative.clone(),
                }
            })
            .collect();

        Ok(CumulativeSeries {
            upto_period,
            contract_total,
            items,
            curve,
        })
    }
}

fn expect_role(table: &ScheduleTable, role: TableRole) -> TrackerResult<()> {
    if table.role() != role {
        return Err(TrackerError::InvalidScheduleState(format!(
            "Expected a {} table but got a {} table",
            role,
            table.role()
        )));
    }
    Ok(())
}

fn expect_pair(plan: &ScheduleTable, measurement: &ScheduleTable) -> TrackerResult<()> {
    expect_role(plan, TableRole::Plan)?;
    expect_role(measurement, TableRole::Measurement)
}

fn ensure_period(
    plan: &ScheduleTable,
    measurement: &ScheduleTable,
    period: u32,
) -> TrackerResult<()> {
    let period_count = plan.period_count().min(measurement.period_count());
    if period == 0 || period > period_count {
        return Err(TrackerError::MissingPeriod {
            period,
            period_count,
        });
    }
    Ok(())
}

fn running_sums(values: impl Iterator<Item = BigDecimal>) -> Vec<BigDecimal> {
    let mut acc = BigDecimal::from(0);
    values
        .map(|value| {
            acc += value;
            acc.clone()
        })
        .collect()
}

fn last_or_zero(values: &[BigDecimal]) -> BigDecimal {
    values.last().cloned().unwrap_or_else(|| BigDecimal::from(0))
}
