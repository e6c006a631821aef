//! Department model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A department with a staffing floor and a set of critical skills.
///
/// On every day a department has an active task, at least
/// `min_staffing_level` of its assigned people must be present and each
/// critical skill must be held by at least one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier for the department.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The department's manager.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Skills that must stay covered on every active day.
    #[serde(default)]
    pub critical_skills: BTreeSet<String>,
    /// Minimum number of non-absent people on any covered day.
    #[serde(default)]
    pub min_staffing_level: u32,
}
