//! Person model and related types.
//!
//! People are owned by the personnel directory and are read-only to the
//! engine for the duration of an operation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The organisational role of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// An individual contributor.
    Employee,
    /// A person who manages a department.
    Manager,
}

/// Represents a person in the personnel directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier for the person.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Organisational role.
    pub role: Role,
    /// The department this person belongs to.
    pub department_id: String,
    /// Job title, e.g. "Site Reliability Engineer".
    #[serde(default)]
    pub job_title: String,
    /// Skill identifiers held by this person.
    #[serde(default)]
    pub skills: BTreeSet<String>,
    /// Seniority level.
    #[serde(default)]
    pub level: u32,
    /// The person's manager, if any.
    #[serde(default)]
    pub manager_id: Option<String>,
}

impl Person {
    /// Returns true if the person holds the given skill.
    ///
    /// # Examples
    ///
    /// ```
    /// use pto_engine::models::{Person, Role};
    ///
    /// let person = Person {
    ///     id: "p1".to_string(),
    ///     name: "Ada".to_string(),
    ///     role: Role::Employee,
    ///     department_id: "ops".to_string(),
    ///     job_title: "SRE".to_string(),
    ///     skills: ["oncall".to_string()].into_iter().collect(),
    ///     level: 2,
    ///     manager_id: None,
    /// };
    /// assert!(person.has_skill("oncall"));
    /// assert!(!person.has_skill("sql"));
    /// ```
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_person_with_defaults() {
        let json = r#"{
            "id": "p1",
            "name": "Ada",
            "role": "employee",
            "department_id": "ops"
        }"#;

        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.role, Role::Employee);
        assert!(person.skills.is_empty());
        assert_eq!(person.level, 0);
        assert_eq!(person.manager_id, None);
    }

    #[test]
    fn test_deserialize_manager() {
        let json = r#"{
            "id": "m1",
            "name": "Grace",
            "role": "manager",
            "department_id": "ops",
            "job_title": "Head of Ops",
            "skills": ["oncall", "budget"],
            "level": 5
        }"#;

        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.role, Role::Manager);
        assert!(person.has_skill("budget"));
        assert_eq!(person.level, 5);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let json = r#"{"id": "p1", "name": "Ada", "role": "owner", "department_id": "ops"}"#;
        assert!(serde_json::from_str::<Person>(json).is_err());
    }
}
