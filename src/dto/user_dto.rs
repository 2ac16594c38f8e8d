use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::review::Review;
use crate::models::user::{
    Availability, ClientProfile, Profile, Role, SocialLinks, StudentProfile, User,
};
use crate::services::project_service::ProjectSummary;
use crate::utils::validation::require_non_blank;

/// Text fields of a registration form, collected from multipart.
#[derive(Debug, Clone, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters"))]
    pub username: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentProfileInput {
    pub full_name: String,
    pub skills: Vec<String>,
    pub bio: String,
    pub portfolio_links: Vec<String>,
    pub availability: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SocialLinksInput {
    #[validate(url(message = "Invalid LinkedIn URL"))]
    pub linkedin: Option<String>,
    #[validate(url(message = "Invalid Twitter URL"))]
    pub twitter: Option<String>,
    #[validate(url(message = "Invalid Website URL"))]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientProfileInput {
    pub org_name: String,
    pub org_description: String,
    pub social_links: Option<SocialLinksInput>,
}

/// Profile fields submitted by a user, keyed by the account role.
#[derive(Debug, Clone)]
pub enum ProfileInput {
    Student(StudentProfileInput),
    Client(ClientProfileInput),
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn clean_link(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl StudentProfileInput {
    pub fn into_profile(self, profile_image_url: String) -> Result<StudentProfile> {
        let missing = "Missing or invalid fields in student profile";
        require_non_blank(&self.full_name, missing)?;
        require_non_blank(&self.bio, missing)?;

        let skills = clean_list(self.skills);
        if skills.is_empty() {
            return Err(Error::BadRequest("Skills must be a non-empty array".into()));
        }
        let portfolio_links = clean_list(self.portfolio_links);
        if portfolio_links.is_empty() {
            return Err(Error::BadRequest(
                "Portfolio links must be a non-empty array".into(),
            ));
        }
        let availability = Availability::from_label(self.availability.trim()).ok_or_else(|| {
            Error::BadRequest("Invalid availability option provided".into())
        })?;

        Ok(StudentProfile {
            full_name: self.full_name.trim().to_string(),
            skills,
            bio: self.bio.trim().to_string(),
            portfolio_links,
            availability,
            profile_image_url,
        })
    }
}

impl ClientProfileInput {
    pub fn into_profile(self, org_logo_url: String) -> Result<ClientProfile> {
        let missing = "Missing or invalid fields in client profile";
        require_non_blank(&self.org_name, missing)?;
        require_non_blank(&self.org_description, missing)?;

        let social_links = match self.social_links {
            Some(links) => {
                let links = SocialLinksInput {
                    linkedin: clean_link(links.linkedin),
                    twitter: clean_link(links.twitter),
                    website: clean_link(links.website),
                };
                links.validate()?;
                Some(SocialLinks {
                    linkedin: links.linkedin,
                    twitter: links.twitter,
                    website: links.website,
                })
            }
            None => None,
        };

        Ok(ClientProfile {
            org_name: self.org_name.trim().to_string(),
            org_description: self.org_description.trim().to_string(),
            org_logo_url,
            social_links,
        })
    }
}

impl ProfileInput {
    /// Parses the profile JSON matching `role`. Admin accounts carry no profile.
    pub fn parse(role: Role, raw: Option<&str>) -> Result<Self> {
        let raw = raw.filter(|s| !s.trim().is_empty());
        match role {
            Role::Student => {
                let raw = raw.ok_or_else(|| Error::BadRequest("Student profile is required".into()))?;
                let input = serde_json::from_str(raw).map_err(|_| {
                    Error::BadRequest("Missing or invalid fields in student profile".into())
                })?;
                Ok(ProfileInput::Student(input))
            }
            Role::Client => {
                let raw = raw.ok_or_else(|| Error::BadRequest("Client profile is required".into()))?;
                let input = serde_json::from_str(raw).map_err(|_| {
                    Error::BadRequest("Missing or invalid fields in client profile".into())
                })?;
                Ok(ProfileInput::Client(input))
            }
            Role::Admin => Err(Error::BadRequest("Admin accounts have no profile".into())),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            ProfileInput::Student(_) => Role::Student,
            ProfileInput::Client(_) => Role::Client,
        }
    }

    /// Validates the input and attaches the stored image (photo or logo).
    pub fn into_profile(self, image_url: String) -> Result<Profile> {
        match self {
            ProfileInput::Student(input) => Ok(Profile::Student(input.into_profile(image_url)?)),
            ProfileInput::Client(input) => Ok(Profile::Client(input.into_profile(image_url)?)),
        }
    }

    pub fn missing_image_message(&self) -> &'static str {
        match self {
            ProfileInput::Student(_) => "Profile image is required",
            ProfileInput::Client(_) => "Organisation logo is required",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_profile: Option<StudentProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_profile: Option<ClientProfile>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(value: User) -> Self {
        let role = value.role();
        let (student_profile, client_profile) = match value.profile {
            Profile::Student(p) => (Some(p), None),
            Profile::Client(p) => (None, Some(p)),
            Profile::Admin => (None, None),
        };
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            role,
            is_blocked: value.is_blocked,
            student_profile,
            client_profile,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
    pub jwt_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectSummary>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub id: Uuid,
    pub is_blocked: bool,
    pub projects_cancelled: u64,
    pub applications_suspended: u64,
}
