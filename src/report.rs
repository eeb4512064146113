//! Report-ready tables handed to the document assembler
//!
//! Each analytical view becomes a [`ReportTable`] with a fixed column list;
//! cells are already formatted text so the assembler can map them 1:1 into
//! document placeholders.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::reconciliation::*;
use crate::types::*;

/// Format an amount with two decimal places
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

/// An ordered, named table of formatted cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(title: &str, columns: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Cell at `row` under the named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }
}

impl From<&PercentageOfContract> for ReportTable {
    fn from(view: &PercentageOfContract) -> Self {
        let mut table = Self::new("Percentage of Contract", &["Item", "Row Total", "Percent"]);
        table.rows = view
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.item.clone(),
                    format_amount(&row.row_total),
                    row.percent.to_string(),
                ]
            })
            .collect();
        table
    }
}

impl From<&CumulativeComparison> for ReportTable {
    fn from(view: &CumulativeComparison) -> Self {
        let mut table = Self::new(
            &format!("Planned vs Realized, Period {}", view.current_period),
            &[
                "Item",
                "Row Total",
                "Planned",
                "Percent Planned",
                "Realized",
                "Percent Realized",
                "Deviation",
            ],
        );
        table.rows = view
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.item.clone(),
                    format_amount(&row.row_total),
                    format_amount(&row.planned_at_current),
                    row.percent_planned.to_string(),
                    format_amount(&row.realized_at_current),
                    row.percent_realized.to_string(),
                    row.deviation.to_string(),
                ]
            })
            .collect();
        table
    }
}

impl From<&PeriodByPeriodComparison> for ReportTable {
    fn from(view: &PeriodByPeriodComparison) -> Self {
        let mut table = Self::new(
            "Planned vs Realized by Period",
            &[
                "Period",
                "Total Planned",
                "Percent Planned",
                "Total Realized",
                "Percent Realized",
                "Deviation",
                "Percent Deviation",
            ],
        );
        table.rows = view
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.period.to_string(),
                    format_amount(&row.total_planned),
                    row.percent_planned.to_string(),
                    format_amount(&row.total_realized),
                    row.percent_realized.to_string(),
                    format_amount(&row.deviation_amount),
                    row.deviation_percent.to_string(),
                ]
            })
            .collect();
        table
    }
}

impl From<&ContractualBalance> for ReportTable {
    fn from(view: &ContractualBalance) -> Self {
        let title = match view.basis {
            BalanceBasis::ProjectWide => "Contractual Balance",
            BalanceBasis::PerItem => "Contractual Balance by Item",
        };
        let mut table = Self::new(
            title,
            &[
                "Item",
                "Row Total",
                "Realized",
                "Percent Realized",
                "Balance",
                "Percent Balance",
            ],
        );
        table.rows = view
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.item.clone(),
                    format_amount(&row.planned_total),
                    format_amount(&row.realized),
                    row.percent_realized.to_string(),
                    format_amount(&row.balance),
                    row.percent_balance.to_string(),
                ]
            })
            .collect();
        table
    }
}

impl From<&CumulativeSeries> for ReportTable {
    fn from(view: &CumulativeSeries) -> Self {
        let mut table = Self::new(
            &format!("Accumulated through Period {}", view.upto_period),
            &[
                "Item",
                "Row Total",
                "Planned to Date",
                "Percent Planned",
                "Realized to Date",
                "Percent Realized",
                "Deviation",
            ],
        );
        table.rows = view
            .items
            .iter()
            .map(|item| {
                vec![
                    item.item.clone(),
                    format_amount(&item.row_total),
                    format_amount(&item.planned_to_date),
                    item.percent_planned.to_string(),
                    format_amount(&item.realized_to_date),
                    item.percent_realized.to_string(),
                    item.deviation.to_string(),
                ]
            })
            .collect();
        table
    }
}

/// Every analytical view of a project at its current period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub project_id: String,
    pub current_period: u32,
    pub period_count: u32,
    /// Contract fields keyed by placeholder name
    pub placeholders: BTreeMap<String, String>,
    pub percentage_of_contract: PercentageOfContract,
    pub current_period_comparison: CumulativeComparison,
    pub period_by_period: PeriodByPeriodComparison,
    pub balance: ContractualBalance,
    pub balance_by_item: ContractualBalance,
    pub cumulative: CumulativeSeries,
}

impl ProgressReport {
    /// Run every view for the project's current period
    pub fn build(project: &Project, engine: &ReconciliationEngine) -> TrackerResult<Self> {
        project.validate_shape()?;
        let plan = &project.plan;
        let measurement = &project.measurement;
        let period = project.current_period;

        Ok(Self {
            project_id: project.id.clone(),
            current_period: period,
            period_count: project.period_count(),
            placeholders: placeholders(project),
            percentage_of_contract: engine.percentage_of_contract(plan)?,
            current_period_comparison: engine.cumulative_comparison(plan, measurement, period)?,
            period_by_period: engine.period_by_period_comparison(plan, measurement, period)?,
            balance: engine.contractual_balance(plan, measurement, BalanceBasis::ProjectWide)?,
            balance_by_item: engine.contractual_balance(plan, measurement, BalanceBasis::PerItem)?,
            cumulative: engine.cumulative_series(plan, measurement, period)?,
        })
    }

    /// All views as report tables, in document order
    pub fn tables(&self) -> Vec<ReportTable> {
        vec![
            ReportTable::from(&self.percentage_of_contract),
            ReportTable::from(&self.current_period_comparison),
            ReportTable::from(&self.period_by_period),
            ReportTable::from(&self.balance),
            ReportTable::from(&self.balance_by_item),
            ReportTable::from(&self.cumulative),
        ]
    }
}

fn placeholders(project: &Project) -> BTreeMap<String, String> {
    let details = &project.details;
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%d/%m/%Y").to_string());

    let mut fields = BTreeMap::new();
    fields.insert("contract_number".to_string(), details.contract_number.clone());
    fields.insert("contracting_party".to_string(), details.contracting_party.clone());
    fields.insert("contractor".to_string(), details.contractor.clone());
    fields.insert("object".to_string(), details.object.clone());
    fields.insert(
        "service_order".to_string(),
        details.service_order.clone().unwrap_or_default(),
    );
    fields.insert(
        "validity_start".to_string(),
        date(details.validity_start).unwrap_or_default(),
    );
    fields.insert(
        "validity_end".to_string(),
        date(details.validity_end).unwrap_or_default(),
    );
    fields.insert("value_received".to_string(), format_amount(&details.value_received));
    fields.insert("contract_total".to_string(), format_amount(&project.plan.contract_total()));
    fields.insert("current_period".to_string(), project.current_period.to_string());
    fields.insert("period_count".to_string(), project.period_count().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleTable;

    fn project() -> Project {
        let plan = ScheduleTable::create_from(
            vec![
                ("Foundation", vec![BigDecimal::from(600), BigDecimal::from(400)]),
                ("Roof", vec![BigDecimal::from(0), BigDecimal::from(1000)]),
            ],
            2,
        )
        .unwrap();
        let mut details = ProjectDetails::new(
            "CT-9/2024".to_string(),
            "City Hospital".to_string(),
            "Acme Builders".to_string(),
            "Ward renovation".to_string(),
        );
        details.validity_start = chrono::NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut project = Project::new(details, plan).unwrap();
        project
            .measurement
            .set_value("Foundation", 1, BigDecimal::from(500))
            .unwrap();
        project.measurement.prepare_for_save().unwrap();
        project
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&BigDecimal::from(12)), "12.00");
        assert_eq!(
            format_amount(&"3.14159".parse::<BigDecimal>().unwrap()),
            "3.14"
        );
    }

    #[test]
    fn test_build_report() {
        let report = ProgressReport::build(&project(), &ReconciliationEngine::new()).unwrap();

        assert_eq!(report.current_period, 1);
        assert_eq!(report.placeholders["contract_number"], "CT-9/2024");
        assert_eq!(report.placeholders["validity_start"], "01/03/2024");
        assert_eq!(report.placeholders["validity_end"], "");
        assert_eq!(report.placeholders["contract_total"], "2000.00");

        let tables = report.tables();
        assert_eq!(tables.len(), 6);

        let comparison = &tables[1];
        assert_eq!(comparison.title, "Planned vs Realized, Period 1");
        assert_eq!(comparison.cell(0, "Planned"), Some("600.00"));
        assert_eq!(comparison.cell(0, "Realized"), Some("500.00"));
        assert_eq!(comparison.cell(0, "Deviation"), Some("-10.00%"));

        let balance = &tables[3];
        assert_eq!(balance.cell(0, "Balance"), Some("500.00"));
        assert_eq!(balance.cell(0, "Percent Realized"), Some("25.00%"));
        assert_eq!(balance.cell(1, "Percent Balance"), Some("50.00%"));
    }

    #[test]
    fn test_build_report_requires_fresh_totals() {
        let mut project = project();
        project
            .measurement
            .set_value("Roof", 2, BigDecimal::from(1))
            .unwrap();

        let result = ProgressReport::build(&project, &ReconciliationEngine::new());
        assert!(matches!(result, Err(TrackerError::MissingTotalsRow(_))));
    }
}
