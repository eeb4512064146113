//! Project tracker that coordinates schedules, measurements and reports

use bigdecimal::BigDecimal;

use crate::config::TrackerConfig;
use crate::project::SearchField;
use crate::reconciliation::ReconciliationEngine;
use crate::report::ProgressReport;
use crate::schedule::ScheduleTable;
use crate::traits::*;
use crate::types::*;

/// Main entry point for registering projects and recording their progress
///
/// Every mutating call loads a snapshot, edits it, and writes plan,
/// measurement and scalars back as one unit. A failed call leaves the stored
/// project untouched.
pub struct ProjectTracker<S: ProjectStore> {
    storage: S,
    validator: Box<dyn ProjectValidator>,
    config: TrackerConfig,
    engine: ReconciliationEngine,
}

impl<S: ProjectStore> ProjectTracker<S> {
    /// Create a new tracker with the given storage backend
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, TrackerConfig::default())
    }

    /// Create a new tracker with custom configuration
    pub fn with_config(storage: S, config: TrackerConfig) -> Self {
        Self::with_validator(storage, config, Box::new(DefaultProjectValidator))
    }

    /// Create a new tracker with custom configuration and validator
    pub fn with_validator(
        storage: S,
        config: TrackerConfig,
        validator: Box<dyn ProjectValidator>,
    ) -> Self {
        Self {
            storage,
            validator,
            config,
            engine: ReconciliationEngine::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Register a contract with its planned schedule
    ///
    /// The measurement table is derived from the plan with every value at 0.
    /// Without an explicit `period_count` the configured default is used.
    pub async fn register_project<I, N>(
        &mut self,
        details: ProjectDetails,
        rows: I,
        period_count: Option<u32>,
    ) -> TrackerResult<Project>
    where
        I: IntoIterator<Item = (N, Vec<BigDecimal>)>,
        N: Into<String>,
    {
        let period_count = period_count.unwrap_or(self.config.default_period_count);
        self.config.check_period_count(period_count)?;
        self.validator.validate_details(&details)?;

        if self
            .storage
            .find_by_contract_number(&details.contract_number)
            .await?
            .is_some()
        {
            return Err(TrackerError::DuplicateProject(details.contract_number));
        }

        let plan = ScheduleTable::create_from(rows, period_count)?;
        self.validator.validate_schedule(&plan)?;

        let project = Project::new(details, plan)?;
        self.storage.insert_project(&project).await?;

        tracing::info!(
            "Registered project {} (contract {}) with {} line items over {} periods",
            project.id,
            project.details.contract_number,
            project.plan.rows().len(),
            period_count
        );
        Ok(project)
    }

    /// Get a project by ID
    pub async fn get_project(&self, project_id: &str) -> TrackerResult<Option<Project>> {
        self.storage.get_project(project_id).await
    }

    /// Get a project by ID, returning an error if not found
    pub async fn get_project_required(&self, project_id: &str) -> TrackerResult<Project> {
        self.storage.load_project(project_id).await
    }

    /// List all projects
    pub async fn list_projects(&self) -> TrackerResult<Vec<Project>> {
        self.storage.list_projects().await
    }

    /// Find projects whose `field` contains `term`, ignoring case
    pub async fn search_projects(
        &self,
        field: SearchField,
        term: &str,
    ) -> TrackerResult<Vec<Project>> {
        let projects = self.storage.list_projects().await?;
        Ok(projects
            .into_iter()
            .filter(|project| field.matches(&project.details, term))
            .collect())
    }

    /// Replace a project's contract metadata
    pub async fn update_details(
        &mut self,
        project_id: &str,
        details: ProjectDetails,
    ) -> TrackerResult<Project> {
        self.validator.validate_details(&details)?;
        let mut project = self.storage.load_project(project_id).await?;

        if details.contract_number != project.details.contract_number {
            if let Some(existing) = self
                .storage
                .find_by_contract_number(&details.contract_number)
                .await?
            {
                if existing.id != project.id {
                    return Err(TrackerError::DuplicateProject(details.contract_number));
                }
            }
        }

        project.details = details;
        self.commit(project).await
    }

    /// Change one planned amount and retarget the measurement to the new totals
    pub async fn update_plan_value(
        &mut self,
        project_id: &str,
        item: &str,
        period: u32,
        amount: BigDecimal,
    ) -> TrackerResult<Project> {
        let mut project = self.storage.load_project(project_id).await?;
        project.validate_shape()?;

        project.plan.set_value(item, period, amount)?;
        project.plan.prepare_for_save()?;
        self.validator.validate_schedule(&project.plan)?;
        project.measurement.retarget_from(&project.plan)?;
        project.measurement.prepare_for_save()?;

        self.commit(project).await
    }

    /// Record measured amounts for one period
    ///
    /// Cell text is coerced forgivingly; unparseable entries count as 0. A
    /// period past the contract duration first grows both schedules to reach
    /// it. The current period never moves backwards, so correcting an
    /// earlier period leaves it in place.
    pub async fn record_measurement<I, N, T>(
        &mut self,
        project_id: &str,
        period: u32,
        entries: I,
    ) -> TrackerResult<Project>
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut project = self.storage.load_project(project_id).await?;
        project.validate_shape()?;

        if period == 0 {
            return Err(TrackerError::MissingPeriod {
                period,
                period_count: project.period_count(),
            });
        }

        if period > project.period_count() {
            self.config.check_period_count(period)?;
            tracing::warn!(
                "Project {} is {} period(s) past its schedule, extending from {} to {} periods",
                project.id,
                period - project.period_count(),
                project.period_count(),
                period
            );
            project.extend_periods(period)?;
        }

        for (item, text) in entries {
            project
                .measurement
                .set_value_text(item.as_ref(), period, text.as_ref())?;
        }

        project.plan.prepare_for_save()?;
        project.measurement.prepare_for_save()?;
        project.advance_to(period);

        let project = self.commit(project).await?;
        tracing::info!(
            "Recorded measurement for project {} period {} (current period {})",
            project.id,
            period,
            project.current_period
        );
        Ok(project)
    }

    /// Delete a project together with its schedules
    pub async fn delete_project(&mut self, project_id: &str) -> TrackerResult<()> {
        self.storage.delete_project(project_id).await?;
        tracing::info!("Deleted project {}", project_id);
        Ok(())
    }

    /// Build every analytical view of a project at its current period
    pub async fn generate_report(&self, project_id: &str) -> TrackerResult<ProgressReport> {
        let project = self.storage.load_project(project_id).await?;
        tracing::debug!(
            "Generating report for project {} at period {} of {}",
            project.id,
            project.current_period,
            project.period_count()
        );
        ProgressReport::build(&project, &self.engine)
    }

    async fn commit(&mut self, mut project: Project) -> TrackerResult<Project> {
        project.touch();
        project.version = self.storage.save_project(&project).await?;
        Ok(project)
    }
}
