//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::schedule::ScheduleTable;
use crate::types::*;

/// Storage abstraction for tracked projects
///
/// A project is stored as one unit: plan, measurement and scalar metadata are
/// always written together. Implementations must reject a `save_project`
/// whose `version` differs from the stored one, so at most one writer wins
/// per version.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Persist a new project; fails if the id is already taken
    async fn insert_project(&mut self, project: &Project) -> TrackerResult<()>;

    /// Get a project by ID
    async fn get_project(&self, project_id: &str) -> TrackerResult<Option<Project>>;

    /// Get a project by ID, failing with `ProjectNotFound` when absent
    async fn load_project(&self, project_id: &str) -> TrackerResult<Project> {
        self.get_project(project_id)
            .await?
            .ok_or_else(|| TrackerError::ProjectNotFound(project_id.to_string()))
    }

    /// Replace a stored project and return its new version
    async fn save_project(&mut self, project: &Project) -> TrackerResult<u64>;

    /// Delete a project together with both of its schedules
    async fn delete_project(&mut self, project_id: &str) -> TrackerResult<()>;

    /// List all projects
    async fn list_projects(&self) -> TrackerResult<Vec<Project>>;

    /// Find the project registered under a contract number
    async fn find_by_contract_number(&self, contract_number: &str)
        -> TrackerResult<Option<Project>>;
}

/// Trait for implementing custom project validation rules
pub trait ProjectValidator: Send + Sync {
    /// Validate contract metadata before saving
    fn validate_details(&self, details: &ProjectDetails) -> TrackerResult<()>;

    /// Validate a schedule before saving
    fn validate_schedule(&self, table: &ScheduleTable) -> TrackerResult<()>;
}

/// Default project validator with basic rules
pub struct DefaultProjectValidator;

impl ProjectValidator for DefaultProjectValidator {
    fn validate_details(&self, details: &ProjectDetails) -> TrackerResult<()> {
        if details.contract_number.trim().is_empty() {
            return Err(TrackerError::Validation(
                "Contract number cannot be empty".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (details.validity_start, details.validity_end) {
            if end < start {
                return Err(TrackerError::Validation(format!(
                    "Validity period ends ({}) before it starts ({})",
                    end, start
                )));
            }
        }

        Ok(())
    }

    fn validate_schedule(&self, table: &ScheduleTable) -> TrackerResult<()> {
        if table.rows().is_empty() {
            return Err(TrackerError::Validation(
                "Schedule must have at least one line item".to_string(),
            ));
        }
        Ok(())
    }
}
