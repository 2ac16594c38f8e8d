use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::BadRequest("Invalid role provided".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "10hrs/week")]
    TenHours,
    #[serde(rename = "15hrs/week")]
    FifteenHours,
    #[serde(rename = "20hrs/week")]
    TwentyHours,
    #[serde(rename = "24hrs/week")]
    TwentyFourHours,
}

impl Availability {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "10hrs/week" => Some(Availability::TenHours),
            "15hrs/week" => Some(Availability::FifteenHours),
            "20hrs/week" => Some(Availability::TwentyHours),
            "24hrs/week" => Some(Availability::TwentyFourHours),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub full_name: String,
    pub skills: Vec<String>,
    pub bio: String,
    pub portfolio_links: Vec<String>,
    pub availability: Availability,
    pub profile_image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub org_name: String,
    pub org_description: String,
    pub org_logo_url: String,
    pub social_links: Option<SocialLinks>,
}

/// Role-specific profile. The role of an account is derived from this.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Student(StudentProfile),
    Client(ClientProfile),
    Admin,
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Student(_) => Role::Student,
            Profile::Client(_) => Role::Client,
            Profile::Admin => Role::Admin,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Profile::Student(p) => Some(&p.profile_image_url),
            Profile::Client(p) => Some(&p.org_logo_url),
            Profile::Admin => None,
        }
    }

    pub fn set_image_url(&mut self, url: String) {
        match self {
            Profile::Student(p) => p.profile_image_url = url,
            Profile::Client(p) => p.org_logo_url = url,
            Profile::Admin => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_blocked: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_blocked: bool,
    pub student_profile: Option<Json<StudentProfile>>,
    pub client_profile: Option<Json<ClientProfile>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let profile = match (row.role, row.student_profile, row.client_profile) {
            (Role::Student, Some(Json(p)), None) => Profile::Student(p),
            (Role::Client, None, Some(Json(p))) => Profile::Client(p),
            (Role::Admin, None, None) => Profile::Admin,
            (role, _, _) => {
                return Err(Error::Internal(format!(
                    "user {} has a profile that does not match role {}",
                    row.id, role
                )))
            }
        };

        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_blocked: row.is_blocked,
            profile,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: Role) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role,
            is_blocked: false,
            student_profile: None,
            client_profile: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn client_row_without_client_profile_is_rejected() {
        let err = User::try_from(row(Role::Client)).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn admin_row_maps_to_admin_profile() {
        let user = User::try_from(row(Role::Admin)).unwrap();
        assert_eq!(user.role(), Role::Admin);
        assert!(user.profile.image_url().is_none());
    }

    #[test]
    fn availability_uses_hours_per_week_labels() {
        let parsed: Availability = serde_json::from_str("\"15hrs/week\"").unwrap();
        assert_eq!(parsed, Availability::FifteenHours);
        assert!(serde_json::from_str::<Availability>("\"40hrs/week\"").is_err());
    }
}
