//! # Progress Core
//!
//! Contract progress tracking: planned disbursement schedules, periodic
//! measurements, and the reconciliation views used to report on them.
//!
//! ## Features
//!
//! - **Schedule tables**: line items by periods with derived row totals and an aggregate totals row
//! - **Measurements**: forgiving entry of realized amounts, with schedule growth for late projects
//! - **Reconciliation**: percentage of contract, period comparisons, contractual balance, cumulative series
//! - **Reporting**: fixed-column tables ready for a document assembler
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use progress_core::{ReconciliationEngine, ScheduleTable};
//! use bigdecimal::BigDecimal;
//!
//! let plan = ScheduleTable::create_from(
//!     vec![("Foundation", vec![BigDecimal::from(100); 10])],
//!     10,
//! )
//! .unwrap();
//! let mut measurement = ScheduleTable::derive_measurement_skeleton(&plan).unwrap();
//! measurement.set_value_text("Foundation", 3, "80").unwrap();
//! measurement.prepare_for_save().unwrap();
//!
//! let view = ReconciliationEngine::new()
//!     .cumulative_comparison(&plan, &measurement, 3)
//!     .unwrap();
//! assert_eq!(view.rows[0].deviation.to_string(), "-2.00%");
//! ```

pub mod config;
pub mod project;
pub mod reconciliation;
pub mod report;
pub mod schedule;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use project::*;
pub use reconciliation::*;
pub use report::*;
pub use schedule::*;
pub use traits::*;
pub use types::*;
