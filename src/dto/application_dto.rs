use serde::{Deserialize, Serialize};

use crate::models::application::ProjectApplication;
use crate::models::project::Project;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentApplicationsQuery {
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApplicationsResponse {
    pub project: Project,
    pub applications: Vec<ProjectApplication>,
}
