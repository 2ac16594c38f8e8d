use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::config::AdminSeed;
use crate::error::{Error, Result};
use crate::models::user::{ClientProfile, Profile, StudentProfile, User, UserRow};
use crate::utils::crypto::{hash_password, verify_password};

pub(crate) const USER_COLUMNS: &str = "id, username, email, password_hash, role, is_blocked, \
     student_profile, client_profile, created_at, updated_at";

/// Everything needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile: Profile,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

type ProfileColumns<'a> = (Option<Json<&'a StudentProfile>>, Option<Json<&'a ClientProfile>>);

fn profile_columns(profile: &Profile) -> ProfileColumns<'_> {
    match profile {
        Profile::Student(p) => (Some(Json(p)), None),
        Profile::Client(p) => (None, Some(Json(p))),
        Profile::Admin => (None, None),
    }
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn identity_taken(&self, username: &str, email: &str) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR lower(email) = lower($2))",
        )
        .bind(username.trim())
        .bind(email.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, account: NewAccount) -> Result<User> {
        if self.identity_taken(&account.username, &account.email).await? {
            return Err(Error::BadRequest(
                "User already exists with given email or username".into(),
            ));
        }

        let password_hash = hash_password(&account.password)?;
        let (student_profile, client_profile) = profile_columns(&account.profile);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, role, student_profile, client_profile)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(account.username.trim())
        .bind(account.email.trim().to_lowercase())
        .bind(password_hash)
        .bind(account.profile.role())
        .bind(student_profile)
        .bind(client_profile)
        .fetch_one(&self.pool)
        .await?;

        let user = User::try_from(row)?;
        tracing::info!(user_id = %user.id, role = %user.role(), "user registered");
        Ok(user)
    }

    /// Checks credentials. Blocked non-admin accounts cannot log in.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || Error::BadRequest("Invalid user credentials".into());

        let user = self.find_by_email(email).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "login failed: wrong password");
            return Err(invalid());
        }
        if user.is_blocked && !matches!(user.profile, Profile::Admin) {
            return Err(Error::Forbidden(
                "Your account is blocked. Access denied.".into(),
            ));
        }
        Ok(user)
    }

    /// Replaces the role-specific profile. The role itself never changes.
    pub async fn update_profile(&self, id: Uuid, profile: Profile) -> Result<User> {
        let current = self.get_by_id(id).await?;
        if current.role() != profile.role() {
            return Err(Error::BadRequest("Profile does not match account role".into()));
        }
        let (student_profile, client_profile) = profile_columns(&profile);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET student_profile = $2, client_profile = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(student_profile)
        .bind(client_profile)
        .fetch_one(&self.pool)
        .await?;

        User::try_from(row)
    }

    /// Creates the configured admin account unless its email is already registered.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> Result<()> {
        if self.find_by_email(&seed.email).await?.is_some() {
            tracing::debug!(email = %seed.email, "admin account already present");
            return Ok(());
        }
        self.create(NewAccount {
            username: seed.username.clone(),
            email: seed.email.clone(),
            password: seed.password.clone(),
            profile: Profile::Admin,
        })
        .await?;
        tracing::info!(email = %seed.email, "admin account created");
        Ok(())
    }
}
