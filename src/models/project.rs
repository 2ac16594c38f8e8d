use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Open,
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Whether application statuses on this project may still be changed.
    pub fn accepts_application_decisions(&self) -> bool {
        matches!(self, ProjectStatus::Open | ProjectStatus::InProgress)
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Open
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProjectStatus::Open),
            "in-progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(Error::BadRequest("Invalid status value".into())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    pub required_skills: Vec<String>,
    pub status: ProjectStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_uses_hyphenated_wire_name() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(
            "in-progress".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProgress
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("archived".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn only_active_projects_accept_application_decisions() {
        assert!(ProjectStatus::Open.accepts_application_decisions());
        assert!(ProjectStatus::InProgress.accepts_application_decisions());
        assert!(!ProjectStatus::Completed.accepts_application_decisions());
        assert!(!ProjectStatus::Cancelled.accepts_application_decisions());
    }
}
