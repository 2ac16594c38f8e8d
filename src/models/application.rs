use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::models::project::ProjectStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid application status")]
    TargetNotAllowed,
    #[error("Application is already {0}")]
    Unchanged(ApplicationStatus),
    #[error("Application has already been {0}")]
    Settled(ApplicationStatus),
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Suspended => "suspended",
        }
    }

    /// Owner-driven transition. Only pending applications can be decided and
    /// nothing moves back to pending; suspension is reserved for moderation.
    pub fn transition_to(self, target: ApplicationStatus) -> Result<ApplicationStatus, TransitionError> {
        if target == ApplicationStatus::Suspended {
            return Err(TransitionError::TargetNotAllowed);
        }
        if self == target {
            return Err(TransitionError::Unchanged(self));
        }
        if self != ApplicationStatus::Pending {
            return Err(TransitionError::Settled(self));
        }
        Ok(target)
    }

    /// Message returned to a student who applies again to the same project.
    pub fn duplicate_message(&self) -> &'static str {
        match self {
            ApplicationStatus::Approved => {
                "Your application for this project has already been approved"
            }
            ApplicationStatus::Rejected => "Your application for this project was rejected",
            ApplicationStatus::Suspended => "Your application for this project has been suspended",
            ApplicationStatus::Pending => {
                "You have already applied for this project and your application is pending"
            }
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "suspended" => Ok(ApplicationStatus::Suspended),
            _ => Err(Error::BadRequest("Invalid application status".into())),
        }
    }
}

impl From<TransitionError> for Error {
    fn from(err: TransitionError) -> Self {
        Error::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub project_id: Uuid,
    pub student_id: Uuid,
    pub resume_url: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application as listed for its student.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentApplication {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub project_title: String,
    pub project_status: ProjectStatus,
}

/// Application as listed for the project owner.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApplication {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub student_username: String,
    pub student_email: String,
}
