use bytes::Bytes;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::application::{
    Application, ApplicationStatus, ProjectApplication, StudentApplication,
};
use crate::models::project::{Project, ProjectStatus};
use crate::models::user::Role;
use crate::services::policy::{self, Action, Resource};
use crate::services::project_service::ProjectService;
use crate::services::storage_service::{Folder, StorageService};
use crate::utils::upload::accept_resume;

const APPLICATION_COLUMNS: &str =
    "id, project_id, student_id, resume_url, status, created_at, updated_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    projects: ProjectService,
    storage: StorageService,
}

impl ApplicationService {
    pub fn new(pool: PgPool, projects: ProjectService, storage: StorageService) -> Self {
        Self {
            pool,
            projects,
            storage,
        }
    }

    async fn find_existing(&self, project_id: Uuid, student_id: Uuid) -> Result<Option<Application>> {
        let existing = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE project_id = $1 AND student_id = $2",
            APPLICATION_COLUMNS
        ))
        .bind(project_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(existing)
    }

    /// Submits a student's application with its resume.
    pub async fn create(
        &self,
        actor: &AuthUser,
        project_id: Uuid,
        resume: Option<Bytes>,
    ) -> Result<Application> {
        policy::require_role(actor, &[Role::Student])?;
        let project = self.projects.get_by_id(project_id).await?;

        if let Some(existing) = self.find_existing(project_id, actor.id).await? {
            return Err(Error::BadRequest(
                existing.status.duplicate_message().to_string(),
            ));
        }
        if project.status != ProjectStatus::Open {
            return Err(Error::BadRequest(
                "Project is not accepting applications".into(),
            ));
        }

        let resume = resume
            .ok_or_else(|| Error::BadRequest("Resume must be a PDF and under 5MB".into()))
            .and_then(accept_resume)?;
        let resume_url = self.storage.store(Folder::Resumes, &resume).await?;

        let inserted = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (project_id, student_id, resume_url)
             VALUES ($1, $2, $3)
             RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(project_id)
        .bind(actor.id)
        .bind(&resume_url)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(application) => {
                tracing::info!(
                    application_id = %application.id,
                    project_id = %project_id,
                    student_id = %actor.id,
                    "application submitted"
                );
                Ok(application)
            }
            Err(e) => {
                self.storage.remove_all([&resume_url]).await;
                let duplicate =
                    matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
                if duplicate {
                    if let Some(existing) = self.find_existing(project_id, actor.id).await? {
                        return Err(Error::BadRequest(
                            existing.status.duplicate_message().to_string(),
                        ));
                    }
                }
                Err(e.into())
            }
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    async fn load_with_project(&self, id: Uuid) -> Result<(Application, Project)> {
        let application = self.get_by_id(id).await?;
        let project = self.projects.get_by_id(application.project_id).await?;
        Ok((application, project))
    }

    pub async fn get(&self, actor: &AuthUser, id: Uuid) -> Result<Application> {
        let (application, project) = self.load_with_project(id).await?;
        policy::authorize(
            actor,
            Action::Read,
            Resource::Application {
                application: &application,
                project_owner: project.created_by,
            },
        )?;
        Ok(application)
    }

    /// Owner decision on a pending application.
    pub async fn update_status(&self, actor: &AuthUser, id: Uuid, raw_status: &str) -> Result<Application> {
        let target = raw_status.trim().parse::<ApplicationStatus>()?;
        let (application, project) = self.load_with_project(id).await?;
        policy::authorize(
            actor,
            Action::DecideApplication,
            Resource::Application {
                application: &application,
                project_owner: project.created_by,
            },
        )?;

        if !project.status.accepts_application_decisions() {
            return Err(Error::BadRequest(format!(
                "Cannot change application status. Project is {}",
                project.status
            )));
        }
        let next = application.status.transition_to(target)?;

        // The status guard makes a concurrent decision lose instead of overwrite.
        let updated = sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications
             SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .bind(next)
        .bind(application.status)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(updated) => {
                tracing::info!(
                    application_id = %id,
                    from = %application.status,
                    to = %next,
                    "application status changed"
                );
                Ok(updated)
            }
            None => {
                let current = self.get_by_id(id).await?;
                Err(current.status.transition_to(target).err().map_or_else(
                    || Error::BadRequest("Application status changed, try again".into()),
                    Error::from,
                ))
            }
        }
    }

    pub async fn delete(&self, actor: &AuthUser, id: Uuid) -> Result<()> {
        let (application, project) = self.load_with_project(id).await?;
        policy::authorize(
            actor,
            Action::Delete,
            Resource::Application {
                application: &application,
                project_owner: project.created_by,
            },
        )?;

        sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.storage.remove_all([&application.resume_url]).await;

        tracing::info!(application_id = %id, "application withdrawn");
        Ok(())
    }

    /// Applications of one student. Students only see their own; admins may pick any.
    pub async fn list_for_student(
        &self,
        actor: &AuthUser,
        student_id: Option<Uuid>,
    ) -> Result<Vec<StudentApplication>> {
        let student_id = match (actor.role, student_id) {
            (Role::Admin, Some(id)) => id,
            (Role::Admin, None) => {
                return Err(Error::BadRequest("studentId is required".into()))
            }
            (Role::Student, Some(id)) if id != actor.id => {
                return Err(Error::Forbidden("Not authorized".into()))
            }
            (Role::Student, _) => actor.id,
            (Role::Client, _) => return Err(Error::Forbidden("Not authorized".into())),
        };

        let applications = sqlx::query_as::<_, StudentApplication>(
            "SELECT a.id, a.project_id, a.student_id, a.resume_url, a.status,
                    a.created_at, a.updated_at,
                    p.title AS project_title, p.status AS project_status
             FROM applications a
             JOIN projects p ON p.id = a.project_id
             WHERE a.student_id = $1
             ORDER BY a.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    pub async fn list_for_project(
        &self,
        actor: &AuthUser,
        project_id: Uuid,
    ) -> Result<(Project, Vec<ProjectApplication>)> {
        let project = self.projects.get_by_id(project_id).await?;
        policy::authorize(actor, Action::ListApplications, Resource::Project(&project))?;

        let applications = sqlx::query_as::<_, ProjectApplication>(
            "SELECT a.id, a.project_id, a.student_id, a.resume_url, a.status,
                    a.created_at, a.updated_at,
                    u.username AS student_username, u.email AS student_email
             FROM applications a
             JOIN users u ON u.id = a.student_id
             WHERE a.project_id = $1
             ORDER BY a.created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok((project, applications))
    }

    /// Whether the student holds an approved application on the project.
    pub async fn is_approved_applicant(&self, project_id: Uuid, student_id: Uuid) -> Result<bool> {
        let approved = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM applications
                WHERE project_id = $1 AND student_id = $2 AND status = $3
            )",
        )
        .bind(project_id)
        .bind(student_id)
        .bind(ApplicationStatus::Approved)
        .fetch_one(&self.pool)
        .await?;
        Ok(approved)
    }
}
