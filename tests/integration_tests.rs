//! Integration tests for progress-core

use progress_core::{
    utils::{EnhancedProjectValidator, MemoryStorage},
    BalanceBasis, ProjectDetails, ProjectStore, ProjectTracker, ReconciliationEngine,
    ScheduleTable, SearchField, TableRole, TrackerConfig, TrackerError,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

fn details(contract_number: &str, contractor: &str) -> ProjectDetails {
    let mut details = ProjectDetails::new(
        contract_number.to_string(),
        "University Hospital".to_string(),
        contractor.to_string(),
        "Surgical wing construction".to_string(),
    );
    details.validity_start = NaiveDate::from_ymd_opt(2024, 1, 1);
    details.validity_end = NaiveDate::from_ymd_opt(2024, 12, 31);
    details
}

fn schedule() -> Vec<(&'static str, Vec<BigDecimal>)> {
    vec![
        ("Foundation", vec![BigDecimal::from(100); 10]),
        ("Structure", vec![BigDecimal::from(400); 10]),
    ]
}

#[tokio::test]
async fn test_complete_tracking_workflow() {
    let storage = MemoryStorage::new();
    let mut tracker = ProjectTracker::new(storage);

    let project = tracker
        .register_project(details("45/2024", "Acme Builders"), schedule(), Some(10))
        .await
        .unwrap();

    tracker
        .record_measurement(&project.id, 1, vec![("Foundation", "100"), ("Structure", "350")])
        .await
        .unwrap();
    tracker
        .record_measurement(&project.id, 2, vec![("Foundation", "120"), ("Structure", "410")])
        .await
        .unwrap();
    let project = tracker
        .record_measurement(&project.id, 3, vec![("Foundation", "80"), ("Structure", "")])
        .await
        .unwrap();

    assert_eq!(project.current_period, 3);
    assert_eq!(project.measurement.row("Foundation").unwrap().row_total, BigDecimal::from(300));

    let report = tracker.generate_report(&project.id).await.unwrap();

    // Single-period view at period 3
    let foundation = &report.current_period_comparison.rows[0];
    assert_eq!(foundation.planned_at_current, BigDecimal::from(100));
    assert_eq!(foundation.realized_at_current, BigDecimal::from(80));
    assert_eq!(foundation.percent_planned.to_string(), "10.00%");
    assert_eq!(foundation.percent_realized.to_string(), "8.00%");
    assert_eq!(foundation.deviation.to_string(), "-2.00%");

    // Running view through period 3
    let structure = &report.cumulative.items[1];
    assert_eq!(structure.planned_to_date, BigDecimal::from(1200));
    assert_eq!(structure.realized_to_date, BigDecimal::from(760));

    // Aggregate per-period view
    assert_eq!(report.period_by_period.rows.len(), 3);
    assert_eq!(report.period_by_period.rows[1].total_realized, BigDecimal::from(530));
    assert_eq!(report.period_by_period.rows[1].percent_planned.to_string(), "10.00%");

    // Balances
    assert_eq!(report.balance.rows[0].balance, BigDecimal::from(700));
    assert_eq!(report.balance.rows[0].percent_realized.to_string(), "6.00%");
    assert_eq!(report.balance_by_item.rows[0].percent_realized.to_string(), "30.00%");

    let tables = report.tables();
    assert_eq!(tables.len(), 6);
    assert!(tables.iter().all(|t| t.rows.iter().all(|r| r.len() == t.columns.len())));
}

#[tokio::test]
async fn test_late_measurement_extends_both_schedules() {
    let storage = MemoryStorage::new();
    let mut tracker = ProjectTracker::new(storage.clone());

    let project = tracker
        .register_project(details("46/2024", "Acme Builders"), schedule(), Some(10))
        .await
        .unwrap();

    let project = tracker
        .record_measurement(&project.id, 12, vec![("Foundation", "50")])
        .await
        .unwrap();

    assert_eq!(project.period_count(), 12);
    assert_eq!(project.plan.period_count(), 12);
    assert_eq!(project.measurement.period_count(), 12);
    assert_eq!(project.current_period, 12);
    assert_eq!(project.plan.value("Foundation", 11), BigDecimal::from(0));
    assert_eq!(project.plan.row("Foundation").unwrap().row_total, BigDecimal::from(1000));
    assert!(project.plan.checked_totals().is_ok());
    assert!(project.measurement.checked_totals().is_ok());

    let stored = storage.load_project(&project.id).await.unwrap();
    assert_eq!(stored.period_count(), 12);

    let report = tracker.generate_report(&project.id).await.unwrap();
    assert_eq!(report.period_by_period.rows.len(), 12);
    assert_eq!(report.period_by_period.rows[11].total_planned, BigDecimal::from(0));
    assert_eq!(report.period_by_period.rows[11].total_realized, BigDecimal::from(50));
}

#[tokio::test]
async fn test_measurement_beyond_configured_maximum_is_rejected() {
    let config = TrackerConfig {
        default_period_count: 6,
        max_period_count: 12,
    };
    let mut tracker = ProjectTracker::with_config(MemoryStorage::new(), config);
    let project = tracker
        .register_project(
            details("47/2024", "Acme Builders"),
            vec![("Foundation", vec![BigDecimal::from(100); 6])],
            None,
        )
        .await
        .unwrap();
    assert_eq!(project.period_count(), 6);

    let result = tracker
        .record_measurement(&project.id, 13, vec![("Foundation", "1")])
        .await;
    assert!(matches!(result, Err(TrackerError::Validation(_))));

    let result = tracker
        .record_measurement(&project.id, 0, vec![("Foundation", "1")])
        .await;
    assert!(matches!(result, Err(TrackerError::MissingPeriod { period: 0, .. })));
}

#[tokio::test]
async fn test_update_plan_retargets_measurement() {
    let mut tracker = ProjectTracker::new(MemoryStorage::new());
    let project = tracker
        .register_project(details("48/2024", "Acme Builders"), schedule(), Some(10))
        .await
        .unwrap();

    tracker
        .record_measurement(&project.id, 1, vec![("Foundation", "100")])
        .await
        .unwrap();
    let project = tracker
        .update_plan_value(&project.id, "Foundation", 1, BigDecimal::from(1100))
        .await
        .unwrap();

    assert_eq!(project.plan.row("Foundation").unwrap().row_total, BigDecimal::from(2000));
    let measured = project.measurement.row("Foundation").unwrap();
    assert_eq!(measured.planned_total, BigDecimal::from(2000));
    assert_eq!(measured.percent_of_row_total.as_ref().unwrap().to_string(), "5.00%");
}

#[tokio::test]
async fn test_search_and_update_details() {
    let mut tracker = ProjectTracker::with_validator(
        MemoryStorage::new(),
        TrackerConfig::default(),
        Box::new(EnhancedProjectValidator),
    );

    let first = tracker
        .register_project(details("10/2024", "Acme Builders"), schedule(), Some(10))
        .await
        .unwrap();
    tracker
        .register_project(details("11/2024", "Northwind Engineering"), schedule(), Some(10))
        .await
        .unwrap();

    let found = tracker
        .search_projects(SearchField::Contractor, "NORTHWIND")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].details.contract_number, "11/2024");

    let by_number = tracker
        .search_projects(SearchField::ContractNumber, "/2024")
        .await
        .unwrap();
    assert_eq!(by_number.len(), 2);

    let clash = tracker
        .update_details(&first.id, details("11/2024", "Acme Builders"))
        .await;
    assert!(matches!(clash, Err(TrackerError::DuplicateProject(_))));

    let mut changed = details("10/2024", "Acme Builders Ltd");
    changed.value_received = BigDecimal::from(2500);
    let updated = tracker.update_details(&first.id, changed).await.unwrap();
    assert_eq!(updated.details.contractor, "Acme Builders Ltd");
    assert_eq!(updated.plan, first.plan);

    let invalid = tracker
        .register_project(details("bad number!", "Acme"), schedule(), Some(10))
        .await;
    assert!(matches!(invalid, Err(TrackerError::Validation(_))));
}

#[tokio::test]
async fn test_delete_project() {
    let mut tracker = ProjectTracker::new(MemoryStorage::new());
    let project = tracker
        .register_project(details("49/2024", "Acme Builders"), schedule(), Some(10))
        .await
        .unwrap();

    tracker.delete_project(&project.id).await.unwrap();
    assert!(tracker.get_project(&project.id).await.unwrap().is_none());
    assert!(matches!(
        tracker.generate_report(&project.id).await,
        Err(TrackerError::ProjectNotFound(_))
    ));
}

#[test]
fn test_engine_on_records_from_document_store() {
    let plan_records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(
        r#"[
            {"Item": "Foundation", "Row Total": "1000", "Period 1": "500", "Period 2": "500", "Total": "1000", "Percent of Total": "20.00%"},
            {"Item": "Structure", "Row Total": "4000", "Period 1": "2000", "Period 2": "2000", "Total": "4000", "Percent of Total": "80.00%"},
            {"Item": "TOTAL", "Row Total": "5000", "Period 1": "2500", "Period 2": "2500", "Total": "5000", "Percent of Total": "100.00%"}
        ]"#,
    )
    .unwrap();
    let measurement_records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(
        r#"[
            {"Item": "Foundation", "Row Total": "1000", "Period 1": "600", "Period 2": ""},
            {"Item": "Structure", "Row Total": "4000", "Period 1": "oops", "Period 2": 0}
        ]"#,
    )
    .unwrap();

    let plan = ScheduleTable::from_records(TableRole::Plan, &plan_records, None).unwrap();
    let measurement =
        ScheduleTable::from_records(TableRole::Measurement, &measurement_records, None).unwrap();

    let balance = ReconciliationEngine::new()
        .contractual_balance(&plan, &measurement, BalanceBasis::ProjectWide)
        .unwrap();
    let foundation = &balance.rows[0];
    assert_eq!(foundation.balance, BigDecimal::from(400));
    assert_eq!(foundation.percent_realized.to_string(), "12.00%");
    assert_eq!(foundation.percent_balance.to_string(), "8.00%");
    assert_eq!(balance.rows[1].realized, BigDecimal::from(0));
}

#[tokio::test]
async fn test_report_on_project_reloaded_from_json() {
    let mut tracker = ProjectTracker::new(MemoryStorage::new());
    let project = tracker
        .register_project(
            details("50/2024", "Acme Builders"),
            vec![("Roof", vec![BigDecimal::from(100); 3])],
            Some(3),
        )
        .await
        .unwrap();
    let project = tracker
        .record_measurement(&project.id, 1, vec![("Roof", "100")])
        .await
        .unwrap();

    let text = serde_json::to_string(&project).unwrap();
    let restored: progress_core::Project = serde_json::from_str(&text).unwrap();

    let mut storage = MemoryStorage::new();
    storage.insert_project(&restored).await.unwrap();
    let tracker = ProjectTracker::new(storage);

    let report = tracker.generate_report(&project.id).await.unwrap();
    assert_eq!(report.period_by_period.rows.len(), 1);
    assert_eq!(report.balance_by_item.rows[0].percent_realized.to_string(), "33.33%");
}
