//! Account moderation: the admin block toggle and account deletion.
//!
//! Both run a fixed, ordered list of [`CascadeStep`]s inside one transaction.
//! Stored files of removed records are deleted only after the commit.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::application::ApplicationStatus;
use crate::models::project::ProjectStatus;
use crate::models::user::Role;
use crate::services::policy::{self, Action, Resource};
use crate::services::storage_service::StorageService;
use crate::services::user_service::UserService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    /// Open and in-progress projects owned by the user become cancelled.
    CancelOwnedProjects,
    /// Every application on the projects cancelled by the previous step.
    SuspendApplicationsOnCancelledProjects,
    /// Pending applications submitted by the user.
    SuspendPendingApplications,
    DeleteReviewsOnOwnedProjects,
    DeleteReviewsByOrAboutUser,
    DeleteApplicationsOnOwnedProjects,
    DeleteOwnApplications,
    DeleteOwnedProjects,
    DeleteAccount,
}

const CLIENT_BLOCK_PLAN: &[CascadeStep] = &[
    CascadeStep::CancelOwnedProjects,
    CascadeStep::SuspendApplicationsOnCancelledProjects,
];

const STUDENT_BLOCK_PLAN: &[CascadeStep] = &[CascadeStep::SuspendPendingApplications];

/// Dependents go before the rows they reference.
pub const DELETE_PLAN: &[CascadeStep] = &[
    CascadeStep::DeleteReviewsOnOwnedProjects,
    CascadeStep::DeleteReviewsByOrAboutUser,
    CascadeStep::DeleteApplicationsOnOwnedProjects,
    CascadeStep::DeleteOwnApplications,
    CascadeStep::DeleteOwnedProjects,
    CascadeStep::DeleteAccount,
];

pub fn block_plan(role: Role) -> &'static [CascadeStep] {
    match role {
        Role::Client => CLIENT_BLOCK_PLAN,
        Role::Student => STUDENT_BLOCK_PLAN,
        Role::Admin => &[],
    }
}

/// What a cascade touched.
#[derive(Debug, Default)]
struct CascadeReport {
    cancelled_projects: Vec<Uuid>,
    suspended_applications: u64,
    removed_files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOutcome {
    pub user_id: Uuid,
    pub is_blocked: bool,
    pub projects_cancelled: u64,
    pub applications_suspended: u64,
}

async fn run_step(
    conn: &mut PgConnection,
    step: CascadeStep,
    user_id: Uuid,
    report: &mut CascadeReport,
) -> Result<()> {
    match step {
        CascadeStep::CancelOwnedProjects => {
            let ids: Vec<Uuid> = sqlx::query_scalar(
                "UPDATE projects SET status = $2, updated_at = NOW()
                 WHERE created_by = $1 AND status IN ($3, $4)
                 RETURNING id",
            )
            .bind(user_id)
            .bind(ProjectStatus::Cancelled)
            .bind(ProjectStatus::Open)
            .bind(ProjectStatus::InProgress)
            .fetch_all(&mut *conn)
            .await?;
            report.cancelled_projects.extend(ids);
        }
        CascadeStep::SuspendApplicationsOnCancelledProjects => {
            if report.cancelled_projects.is_empty() {
                return Ok(());
            }
            let result = sqlx::query(
                "UPDATE applications SET status = $2, updated_at = NOW()
                 WHERE project_id = ANY($1) AND status <> $2",
            )
            .bind(&report.cancelled_projects)
            .bind(ApplicationStatus::Suspended)
            .execute(&mut *conn)
            .await?;
            report.suspended_applications += result.rows_affected();
        }
        CascadeStep::SuspendPendingApplications => {
            let result = sqlx::query(
                "UPDATE applications SET status = $2, updated_at = NOW()
                 WHERE student_id = $1 AND status = $3",
            )
            .bind(user_id)
            .bind(ApplicationStatus::Suspended)
            .bind(ApplicationStatus::Pending)
            .execute(&mut *conn)
            .await?;
            report.suspended_applications += result.rows_affected();
        }
        CascadeStep::DeleteReviewsOnOwnedProjects => {
            sqlx::query(
                "DELETE FROM reviews
                 WHERE project_id IN (SELECT id FROM projects WHERE created_by = $1)",
            )
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        }
        CascadeStep::DeleteReviewsByOrAboutUser => {
            sqlx::query("DELETE FROM reviews WHERE reviewer_id = $1 OR reviewee_id = $1")
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
        }
        CascadeStep::DeleteApplicationsOnOwnedProjects => {
            let resumes: Vec<String> = sqlx::query_scalar(
                "DELETE FROM applications
                 WHERE project_id IN (SELECT id FROM projects WHERE created_by = $1)
                 RETURNING resume_url",
            )
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
            report.removed_files.extend(resumes);
        }
        CascadeStep::DeleteOwnApplications => {
            let resumes: Vec<String> = sqlx::query_scalar(
                "DELETE FROM applications WHERE student_id = $1 RETURNING resume_url",
            )
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
            report.removed_files.extend(resumes);
        }
        CascadeStep::DeleteOwnedProjects => {
            sqlx::query("DELETE FROM projects WHERE created_by = $1")
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
        }
        CascadeStep::DeleteAccount => {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ModerationService {
    pool: PgPool,
    users: UserService,
    storage: StorageService,
}

impl ModerationService {
    pub fn new(pool: PgPool, users: UserService, storage: StorageService) -> Self {
        Self {
            pool,
            users,
            storage,
        }
    }

    /// Flips the block flag. Blocking also runs the role's block cascade;
    /// unblocking only clears the flag.
    pub async fn toggle_block(&self, actor: &AuthUser, user_id: Uuid) -> Result<BlockOutcome> {
        policy::require_role(actor, &[Role::Admin])?;

        let mut tx = self.pool.begin().await?;
        let (role, was_blocked): (Role, bool) =
            sqlx::query_as("SELECT role, is_blocked FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| Error::NotFound("User not found".into()))?;

        if role == Role::Admin {
            return Err(Error::BadRequest("Admin accounts cannot be blocked".into()));
        }

        let is_blocked = !was_blocked;
        sqlx::query("UPDATE users SET is_blocked = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(is_blocked)
            .execute(&mut *tx)
            .await?;

        let mut report = CascadeReport::default();
        if is_blocked {
            for step in block_plan(role) {
                run_step(&mut *tx, *step, user_id, &mut report).await?;
            }
        }
        tx.commit().await?;

        let outcome = BlockOutcome {
            user_id,
            is_blocked,
            projects_cancelled: report.cancelled_projects.len() as u64,
            applications_suspended: report.suspended_applications,
        };
        tracing::info!(
            admin_id = %actor.id,
            user_id = %user_id,
            is_blocked,
            projects_cancelled = outcome.projects_cancelled,
            applications_suspended = outcome.applications_suspended,
            "block status toggled"
        );
        Ok(outcome)
    }

    /// Deletes an account and everything that depends on it.
    pub async fn delete_user(&self, actor: &AuthUser, user_id: Uuid) -> Result<()> {
        policy::authorize(actor, Action::Delete, Resource::User(user_id))?;
        let user = self.users.get_by_id(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut report = CascadeReport::default();
        for step in DELETE_PLAN {
            run_step(&mut *tx, *step, user_id, &mut report).await?;
        }
        tx.commit().await?;

        if let Some(image) = user.profile.image_url() {
            report.removed_files.push(image.to_string());
        }
        tracing::info!(
            actor_id = %actor.id,
            user_id = %user_id,
            files = report.removed_files.len(),
            "user deleted"
        );
        self.storage.remove_all(&report.removed_files).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(plan: &[CascadeStep], step: CascadeStep) -> usize {
        plan.iter()
            .position(|s| *s == step)
            .unwrap_or_else(|| panic!("{:?} missing from plan", step))
    }

    #[test]
    fn client_block_cancels_before_suspending() {
        let plan = block_plan(Role::Client);
        assert!(
            position(plan, CascadeStep::CancelOwnedProjects)
                < position(plan, CascadeStep::SuspendApplicationsOnCancelledProjects)
        );
    }

    #[test]
    fn student_block_only_suspends_pending_applications() {
        assert_eq!(
            block_plan(Role::Student),
            &[CascadeStep::SuspendPendingApplications]
        );
        assert!(block_plan(Role::Admin).is_empty());
    }

    #[test]
    fn delete_plan_removes_dependents_first() {
        let account = position(DELETE_PLAN, CascadeStep::DeleteAccount);
        let projects = position(DELETE_PLAN, CascadeStep::DeleteOwnedProjects);
        assert_eq!(account, DELETE_PLAN.len() - 1);
        for step in [
            CascadeStep::DeleteReviewsOnOwnedProjects,
            CascadeStep::DeleteApplicationsOnOwnedProjects,
        ] {
            assert!(position(DELETE_PLAN, step) < projects);
        }
        assert!(position(DELETE_PLAN, CascadeStep::DeleteOwnApplications) < account);
        assert!(position(DELETE_PLAN, CascadeStep::DeleteReviewsByOrAboutUser) < account);
    }
}
