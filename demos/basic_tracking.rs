//! Basic contract tracking example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use progress_core::utils::MemoryStorage;
use progress_core::{ProjectDetails, ProjectTracker};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📐 Progress Core - Basic Tracking Example\n");

    let storage = MemoryStorage::new();
    let mut tracker = ProjectTracker::new(storage);

    // 1. Register a contract with its planned schedule
    let mut details = ProjectDetails::new(
        "045/2024".to_string(),
        "University Hospital".to_string(),
        "Acme Builders".to_string(),
        "Surgical wing construction".to_string(),
    );
    details.validity_start = NaiveDate::from_ymd_opt(2024, 1, 1);
    details.validity_end = NaiveDate::from_ymd_opt(2024, 6, 30);

    let project = tracker
        .register_project(
            details,
            vec![
                ("Foundation", vec![BigDecimal::from(20000); 6]),
                (
                    "Structure",
                    vec![
                        BigDecimal::from(0),
                        BigDecimal::from(30000),
                        BigDecimal::from(30000),
                        BigDecimal::from(30000),
                        BigDecimal::from(30000),
                        BigDecimal::from(0),
                    ],
                ),
            ],
            Some(6),
        )
        .await?;
    println!(
        "  ✓ Registered contract {} over {} periods\n",
        project.details.contract_number,
        project.period_count()
    );

    // 2. Record monthly measurements; the last one runs past the schedule
    let measurements = [
        (1, vec![("Foundation", "18000"), ("Structure", "0")]),
        (2, vec![("Foundation", "21.500,00"), ("Structure", "25000")]),
        (3, vec![("Foundation", "20000"), ("Structure", "")]),
        (7, vec![("Foundation", "5000"), ("Structure", "40000")]),
    ];
    for (period, entries) in measurements {
        let updated = tracker.record_measurement(&project.id, period, entries).await?;
        println!(
            "  ✓ Period {} recorded (schedule now {} periods)",
            period,
            updated.period_count()
        );
    }
    println!();

    // 3. Produce the report tables
    let report = tracker.generate_report(&project.id).await?;
    for table in report.tables() {
        println!("📊 {}", table.title);
        println!("  {}", table.columns.join(" | "));
        for row in &table.rows {
            println!("  {}", row.join(" | "));
        }
        println!();
    }

    Ok(())
}
