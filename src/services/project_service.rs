use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::project_dto::{ProjectFilter, ProjectPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::project::{Project, ProjectStatus};
use crate::models::user::Role;
use crate::services::policy::{self, Action, ProjectScope, Resource};
use crate::services::storage_service::StorageService;

pub(crate) const PROJECT_COLUMNS: &str = "id, title, description, budget, deadline, \
     required_skills, status, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct ProjectService {
    pool: PgPool,
    storage: StorageService,
}

pub struct ProjectList {
    pub items: Vec<Project>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Short form of a project shown on its owner's profile.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter, scope: ProjectScope) {
    qb.push(" WHERE TRUE");
    match scope {
        ProjectScope::All => {}
        ProjectScope::OwnedBy(owner) => {
            qb.push(" AND created_by = ").push_bind(owner);
        }
        ProjectScope::OpenOnly => {
            qb.push(" AND status = ").push_bind(ProjectStatus::Open);
        }
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if !filter.skills.is_empty() {
        qb.push(" AND required_skills @> ")
            .push_bind(filter.skills.clone());
    }
    if let Some(min) = filter.min_budget {
        qb.push(" AND budget >= ").push_bind(min);
    }
    if let Some(max) = filter.max_budget {
        qb.push(" AND budget <= ").push_bind(max);
    }
    if let Some(before) = filter.before_deadline {
        qb.push(" AND deadline <= ").push_bind(before);
    }
    if let Some(after) = filter.after_deadline {
        qb.push(" AND deadline >= ").push_bind(after);
    }
}

fn total_pages(total: i64, per_page: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + per_page - 1) / per_page
    }
}

impl ProjectService {
    pub fn new(pool: PgPool, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    async fn title_taken(&self, owner: Uuid, title: &str, except: Option<Uuid>) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM projects
                WHERE created_by = $1 AND title = $2 AND ($3::uuid IS NULL OR id <> $3)
            )",
        )
        .bind(owner)
        .bind(title)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, actor: &AuthUser, payload: ProjectPayload) -> Result<Project> {
        policy::require_role(actor, &[Role::Client])?;
        let draft = payload.into_draft(Utc::now())?;
        if self.title_taken(actor.id, &draft.title, None).await? {
            return Err(Error::BadRequest(
                "Project with this title already exists for your account".into(),
            ));
        }

        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (title, description, budget, deadline, required_skills, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.budget)
        .bind(draft.deadline)
        .bind(&draft.required_skills)
        .bind(draft.status.unwrap_or_default())
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(project_id = %project.id, owner = %actor.id, "project created");
        Ok(project)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Project> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".into()))
    }

    /// Loads a project the caller is allowed to see.
    pub async fn get(&self, actor: &AuthUser, id: Uuid) -> Result<Project> {
        let project = self.get_by_id(id).await?;
        policy::authorize(actor, Action::Read, Resource::Project(&project))?;
        Ok(project)
    }

    pub async fn list(&self, actor: &AuthUser, filter: &ProjectFilter) -> Result<ProjectList> {
        let scope = policy::project_list_scope(actor, filter.status)?;
        let offset = filter.offset()?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects");
        push_conditions(&mut count, filter, scope);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM projects", PROJECT_COLUMNS));
        push_conditions(&mut select, filter, scope);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.per_page)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = select
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ProjectList {
            items,
            total,
            page: filter.page,
            per_page: filter.per_page,
            total_pages: total_pages(total, filter.per_page),
        })
    }

    /// Ownership is checked before the payload is validated.
    pub async fn update(&self, actor: &AuthUser, id: Uuid, payload: ProjectPayload) -> Result<Project> {
        let existing = self.get_by_id(id).await?;
        policy::authorize(actor, Action::Update, Resource::Project(&existing))?;
        let draft = payload.into_draft(Utc::now())?;

        let status = draft.status.unwrap_or(existing.status);
        if existing.status == ProjectStatus::Completed && status != ProjectStatus::Completed {
            return Err(Error::BadRequest(
                "Cannot change status of a completed project".into(),
            ));
        }
        if self
            .title_taken(existing.created_by, &draft.title, Some(id))
            .await?
        {
            return Err(Error::BadRequest(
                "Project with this title already exists for your account".into(),
            ));
        }

        let project = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects
             SET title = $2, description = $3, budget = $4, deadline = $5,
                 required_skills = $6, status = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.budget)
        .bind(draft.deadline)
        .bind(&draft.required_skills)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        if status != existing.status {
            tracing::info!(project_id = %id, from = %existing.status, to = %status, "project status changed");
        }
        Ok(project)
    }

    /// Removes the project together with its reviews, applications and resumes.
    pub async fn delete(&self, actor: &AuthUser, id: Uuid) -> Result<()> {
        let project = self.get_by_id(id).await?;
        policy::authorize(actor, Action::Delete, Resource::Project(&project))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM reviews WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let resumes: Vec<String> = sqlx::query_scalar(
            "DELETE FROM applications WHERE project_id = $1 RETURNING resume_url",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(project_id = %id, applications = resumes.len(), "project deleted");
        self.storage.remove_all(&resumes).await;
        Ok(())
    }

    pub async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<ProjectSummary>> {
        let projects = sqlx::query_as::<_, ProjectSummary>(
            "SELECT id, title, description, status, created_at
             FROM projects
             WHERE created_by = $1
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ProjectFilter {
        ProjectFilter {
            status: None,
            skills: Vec::new(),
            min_budget: None,
            max_budget: None,
            before_deadline: None,
            after_deadline: None,
            page: 1,
            per_page: 20,
        }
    }

    #[test]
    fn open_only_scope_forces_open_status() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects");
        push_conditions(&mut qb, &filter(), ProjectScope::OpenOnly);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM projects WHERE TRUE AND status = $1");
    }

    #[test]
    fn filters_are_bound_in_order() {
        let mut f = filter();
        f.skills = vec!["rust".into()];
        f.min_budget = Some(rust_decimal::Decimal::from(50));
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects");
        push_conditions(&mut qb, &f, ProjectScope::OwnedBy(Uuid::new_v4()));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM projects WHERE TRUE AND created_by = $1 \
             AND required_skills @> $2 AND budget >= $3"
        );
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
