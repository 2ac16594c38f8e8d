use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::review_dto::{CreateReviewPayload, UpdateReviewPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::review::Review;
use crate::models::user::Role;
use crate::services::application_service::ApplicationService;
use crate::services::policy::{self, Action, Resource};
use crate::services::project_service::ProjectService;
use crate::services::user_service::UserService;
use crate::utils::validation::{require_non_blank, validate};

const REVIEW_COLUMNS: &str =
    "id, project_id, rating, comment, reviewer_id, reviewee_id, created_at, updated_at";

#[derive(Clone)]
pub struct ReviewService {
    pool: PgPool,
    projects: ProjectService,
    applications: ApplicationService,
    users: UserService,
}

fn clean_comment(comment: &str) -> Result<String> {
    require_non_blank(comment, "Comment is required")?;
    Ok(comment.trim().to_string())
}

impl ReviewService {
    pub fn new(
        pool: PgPool,
        projects: ProjectService,
        applications: ApplicationService,
        users: UserService,
    ) -> Self {
        Self {
            pool,
            projects,
            applications,
            users,
        }
    }

    pub async fn create(&self, actor: &AuthUser, payload: CreateReviewPayload) -> Result<Review> {
        policy::require_role(actor, &[Role::Client])?;
        let project = self.projects.get_by_id(payload.project_id).await?;
        policy::authorize(actor, Action::WriteReview, Resource::Project(&project))?;

        validate(&payload)?;
        let comment = clean_comment(&payload.comment)?;

        self.users.get_by_id(payload.reviewee_id).await?;
        if !self
            .applications
            .is_approved_applicant(project.id, payload.reviewee_id)
            .await?
        {
            return Err(Error::Forbidden(
                "You can only review students assigned to this project".into(),
            ));
        }

        let already = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM reviews
                WHERE project_id = $1 AND reviewer_id = $2 AND reviewee_id = $3
            )",
        )
        .bind(project.id)
        .bind(actor.id)
        .bind(payload.reviewee_id)
        .fetch_one(&self.pool)
        .await?;
        if already {
            return Err(Error::BadRequest(
                "You already reviewed this student for this project".into(),
            ));
        }

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (project_id, rating, comment, reviewer_id, reviewee_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(project.id)
        .bind(payload.rating)
        .bind(comment)
        .bind(actor.id)
        .bind(payload.reviewee_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(review_id = %review.id, project_id = %project.id, "review created");
        Ok(review)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Review> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Review not found".into()))
    }

    pub async fn update(&self, actor: &AuthUser, id: Uuid, payload: UpdateReviewPayload) -> Result<Review> {
        let review = self.get_by_id(id).await?;
        policy::authorize(actor, Action::Update, Resource::Review(&review))?;
        validate(&payload)?;
        let comment = clean_comment(&payload.comment)?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(payload.rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    pub async fn delete(&self, actor: &AuthUser, id: Uuid) -> Result<()> {
        let review = self.get_by_id(id).await?;
        policy::authorize(actor, Action::Delete, Resource::Review(&review))?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(review_id = %id, "review deleted");
        Ok(())
    }

    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE project_id = $1 ORDER BY created_at DESC",
            REVIEW_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn list_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE reviewee_id = $1 ORDER BY created_at DESC",
            REVIEW_COLUMNS
        ))
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_trimmed_and_must_not_be_blank() {
        assert_eq!(clean_comment("  solid work ").unwrap(), "solid work");
        let err = clean_comment("   ").unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Comment is required"));
    }
}
