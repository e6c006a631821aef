//! Personnel and task directory.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{Department, Person, Task};

/// Read-only view of people, departments and tasks.
pub trait Directory: Send + Sync {
    /// Lists every known person.
    fn list_people(&self) -> EngineResult<Vec<Person>>;
    /// Lists every department.
    fn list_departments(&self) -> EngineResult<Vec<Department>>;
    /// Lists every task.
    fn list_tasks(&self) -> EngineResult<Vec<Task>>;
}

/// A directory held entirely in memory, typically loaded from
/// `directory.yaml` by [`crate::config::ConfigLoader`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDirectory {
    /// People in the directory.
    #[serde(default)]
    pub people: Vec<Person>,
    /// Departments in the directory.
    #[serde(default)]
    pub departments: Vec<Department>,
    /// Tasks in the directory.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Directory for StaticDirectory {
    fn list_people(&self) -> EngineResult<Vec<Person>> {
        Ok(self.people.clone())
    }

    fn list_departments(&self) -> EngineResult<Vec<Department>> {
        Ok(self.departments.clone())
    }

    fn list_tasks(&self) -> EngineResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }
}
