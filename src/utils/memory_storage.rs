//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying map, so a clone handed to a tracker and
/// one kept by a test observe the same projects.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    projects: Arc<RwLock<HashMap<String, Project>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn read(&self) -> TrackerResult<RwLockReadGuard<'_, HashMap<String, Project>>> {
        self.projects
            .read()
            .map_err(|_| TrackerError::Storage("Project map lock poisoned".to_string()))
    }

    fn write(&self) -> TrackerResult<RwLockWriteGuard<'_, HashMap<String, Project>>> {
        self.projects
            .write()
            .map_err(|_| TrackerError::Storage("Project map lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectStore for MemoryStorage {
    async fn insert_project(&mut self, project: &Project) -> TrackerResult<()> {
        let mut projects = self.write()?;
        if projects.contains_key(&project.id) {
            return Err(TrackerError::DuplicateProject(project.id.clone()));
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn get_project(&self, project_id: &str) -> TrackerResult<Option<Project>> {
        Ok(self.read()?.get(project_id).cloned())
    }

    async fn save_project(&mut self, project: &Project) -> TrackerResult<u64> {
        let mut projects = self.write()?;
        let stored = projects
            .get_mut(&project.id)
            .ok_or_else(|| TrackerError::ProjectNotFound(project.id.clone()))?;

        if stored.version != project.version {
            return Err(TrackerError::VersionConflict {
                id: project.id.clone(),
                expected: project.version,
                found: stored.version,
            });
        }

        let mut updated = project.clone();
        updated.version += 1;
        let version = updated.version;
        *stored = updated;
        Ok(version)
    }

    async fn delete_project(&mut self, project_id: &str) -> TrackerResult<()> {
        if self.write()?.remove(project_id).is_some() {
            Ok(())
        } else {
            Err(TrackerError::ProjectNotFound(project_id.to_string()))
        }
    }

    async fn list_projects(&self) -> TrackerResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.read()?.values().cloned().collect();
        projects.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.details.contract_number.cmp(&b.details.contract_number))
        });
        Ok(projects)
    }

    async fn find_by_contract_number(
        &self,
        contract_number: &str,
    ) -> TrackerResult<Option<Project>> {
        Ok(self
            .read()?
            .values()
            .find(|project| project.details.contract_number == contract_number)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleTable;
    use bigdecimal::BigDecimal;

    fn project(contract_number: &str) -> Project {
        let plan = ScheduleTable::create_from(
            vec![("Foundation", vec![BigDecimal::from(100), BigDecimal::from(100)])],
            2,
        )
        .unwrap();
        let details = ProjectDetails::new(
            contract_number.to_string(),
            "City Hospital".to_string(),
            "Acme Builders".to_string(),
            "Ward renovation".to_string(),
        );
        Project::new(details, plan).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let mut storage = MemoryStorage::new();
        let project = project("1/2024");
        storage.insert_project(&project).await.unwrap();

        let loaded = storage.load_project(&project.id).await.unwrap();
        assert_eq!(loaded, project);
        assert!(matches!(
            storage.insert_project(&project).await,
            Err(TrackerError::DuplicateProject(_))
        ));
        assert!(matches!(
            storage.load_project("missing").await,
            Err(TrackerError::ProjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_rejects_stale_writes() {
        let mut storage = MemoryStorage::new();
        let project = project("1/2024");
        storage.insert_project(&project).await.unwrap();

        let mut first = storage.load_project(&project.id).await.unwrap();
        let mut second = first.clone();

        first.current_period = 2;
        let version = storage.save_project(&first).await.unwrap();
        assert_eq!(version, 1);

        second.details.object = "Concurrent edit".to_string();
        let result = storage.save_project(&second).await;
        assert!(matches!(
            result,
            Err(TrackerError::VersionConflict { expected: 0, found: 1, .. })
        ));

        let stored = storage.load_project(&project.id).await.unwrap();
        assert_eq!(stored.current_period, 2);
        assert_eq!(stored.details.object, "Ward renovation");
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let mut storage = MemoryStorage::new();
        let project = project("7/2023");
        storage.insert_project(&project).await.unwrap();

        let found = storage.find_by_contract_number("7/2023").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(project.id.clone()));

        storage.delete_project(&project.id).await.unwrap();
        assert!(storage.list_projects().await.unwrap().is_empty());
        assert!(storage.delete_project(&project.id).await.is_err());
    }
}
