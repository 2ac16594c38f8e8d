use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::project::{Project, ProjectStatus};
use crate::models::review::Review;
use crate::services::project_service::ProjectList;
use crate::utils::validation::parse_datetime;

/// Highest page a listing will serve.
pub const MAX_PAGE: i64 = 100_000;

/// Largest value the `NUMERIC(14, 2)` budget column holds.
fn max_budget() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// At most two decimal places and within the column's range.
fn fits_budget_column(value: Decimal) -> bool {
    value.normalize().scale() <= 2 && value.abs() <= max_budget()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<Decimal>,
    pub deadline: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub status: Option<String>,
}

/// A project payload that passed field validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    pub required_skills: Vec<String>,
    /// `None` when the payload did not name a status.
    pub status: Option<ProjectStatus>,
}

impl ProjectPayload {
    pub fn into_draft(self, now: DateTime<Utc>) -> Result<ProjectDraft> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        let description = self.description.as_deref().map(str::trim).unwrap_or_default();
        let deadline_raw = self.deadline.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || description.is_empty() || self.budget.is_none() || deadline_raw.is_empty() {
            return Err(Error::BadRequest(
                "Title, description, budget, and deadline are required".into(),
            ));
        }

        let budget = self.budget.unwrap_or_default();
        if budget <= Decimal::ZERO || !fits_budget_column(budget) {
            return Err(Error::BadRequest(
                "Budget must be a valid positive number".into(),
            ));
        }

        let deadline = parse_datetime(deadline_raw)
            .ok_or_else(|| Error::BadRequest("Invalid deadline date".into()))?;
        if deadline <= now {
            return Err(Error::BadRequest("Deadline must be a future date".into()));
        }

        let required_skills: Vec<String> = self
            .required_skills
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if required_skills.is_empty() {
            return Err(Error::BadRequest(
                "Required skills must be a non-empty array".into(),
            ));
        }

        let status = self
            .status
            .as_deref()
            .map(|raw| raw.trim().parse::<ProjectStatus>())
            .transpose()?;

        Ok(ProjectDraft {
            title: title.to_string(),
            description: description.to_string(),
            budget,
            deadline,
            required_skills,
            status,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub skills: Option<String>,
    pub min_budget: Option<String>,
    pub max_budget: Option<String>,
    pub before_deadline: Option<String>,
    pub after_deadline: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub skills: Vec<String>,
    pub min_budget: Option<Decimal>,
    pub max_budget: Option<Decimal>,
    pub before_deadline: Option<DateTime<Utc>>,
    pub after_deadline: Option<DateTime<Utc>>,
    pub page: i64,
    pub per_page: i64,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_budget(raw: Option<&str>, name: &str) -> Result<Option<Decimal>> {
    raw.map(|s| {
        s.parse::<Decimal>()
            .ok()
            .filter(|value| !value.is_sign_negative() && value.abs() <= max_budget())
            .ok_or_else(|| Error::BadRequest(format!("{} must be a valid number", name)))
    })
    .transpose()
}

fn parse_deadline(raw: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        parse_datetime(s).ok_or_else(|| Error::BadRequest(format!("{} must be a valid date", name)))
    })
    .transpose()
}

impl TryFrom<ProjectListQuery> for ProjectFilter {
    type Error = Error;

    fn try_from(query: ProjectListQuery) -> Result<Self> {
        let status = non_empty(&query.status)
            .map(|s| {
                s.parse::<ProjectStatus>()
                    .map_err(|_| Error::BadRequest("Invalid status filter".into()))
            })
            .transpose()?;

        let skills = non_empty(&query.skills)
            .map(|s| {
                s.split(',')
                    .map(|skill| skill.trim().to_string())
                    .filter(|skill| !skill.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let page = non_empty(&query.page)
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_PAGE);
        let per_page = non_empty(&query.per_page)
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(20)
            .clamp(1, 100);

        Ok(Self {
            status,
            skills,
            min_budget: parse_budget(non_empty(&query.min_budget), "minBudget")?,
            max_budget: parse_budget(non_empty(&query.max_budget), "maxBudget")?,
            before_deadline: parse_deadline(non_empty(&query.before_deadline), "beforeDeadline")?,
            after_deadline: parse_deadline(non_empty(&query.after_deadline), "afterDeadline")?,
            page,
            per_page,
        })
    }
}

impl ProjectFilter {
    /// Row offset of the requested page.
    pub fn offset(&self) -> Result<i64> {
        self.page
            .checked_sub(1)
            .and_then(|page| page.checked_mul(self.per_page))
            .filter(|offset| *offset >= 0)
            .ok_or_else(|| Error::BadRequest("page is out of range".into()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<ProjectList> for ProjectListResponse {
    fn from(value: ProjectList) -> Self {
        Self {
            items: value.items,
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload() -> ProjectPayload {
        ProjectPayload {
            title: Some(" Landing page ".into()),
            description: Some("Build it".into()),
            budget: Some(Decimal::new(25000, 2)),
            deadline: Some((Utc::now() + Duration::days(10)).to_rfc3339()),
            required_skills: Some(vec!["html".into(), " css ".into()]),
            status: None,
        }
    }

    #[test]
    fn valid_payload_is_trimmed() {
        let draft = payload().into_draft(Utc::now()).unwrap();
        assert_eq!(draft.title, "Landing page");
        assert_eq!(draft.status, None);
        assert_eq!(draft.required_skills, vec!["html", "css"]);
    }

    #[test]
    fn past_deadline_is_rejected() {
        let mut p = payload();
        p.deadline = Some("2001-01-01".into());
        let err = p.into_draft(Utc::now()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Deadline must be a future date"));
    }

    #[test]
    fn non_positive_budget_is_rejected() {
        let mut p = payload();
        p.budget = Some(Decimal::ZERO);
        let err = p.into_draft(Utc::now()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg.starts_with("Budget")));
    }

    #[test]
    fn budget_must_fit_two_decimal_places() {
        let mut p = payload();
        p.budget = Some(Decimal::new(1, 3));
        let err = p.into_draft(Utc::now()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Budget must be a valid positive number"));

        let mut p = payload();
        p.budget = Some(Decimal::from(1_000_000_000_000_000_i64));
        assert!(p.into_draft(Utc::now()).is_err());

        let mut p = payload();
        p.budget = Some(Decimal::new(125000, 3));
        assert_eq!(p.into_draft(Utc::now()).unwrap().budget, Decimal::new(125, 0));
    }

    #[test]
    fn blank_skills_count_as_missing() {
        let mut p = payload();
        p.required_skills = Some(vec!["  ".into()]);
        assert!(p.into_draft(Utc::now()).is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut p = payload();
        p.status = Some("paused".into());
        let err = p.into_draft(Utc::now()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Invalid status value"));
    }

    #[test]
    fn list_query_parses_filters() {
        let filter = ProjectFilter::try_from(ProjectListQuery {
            status: Some("in-progress".into()),
            skills: Some("rust, sql,".into()),
            min_budget: Some("100".into()),
            before_deadline: Some("2031-01-01".into()),
            per_page: Some("500".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.status, Some(ProjectStatus::InProgress));
        assert_eq!(filter.skills, vec!["rust", "sql"]);
        assert_eq!(filter.min_budget, Some(Decimal::from(100)));
        assert_eq!(filter.per_page, 100);
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn huge_page_is_capped_and_offset_stays_in_range() {
        let filter = ProjectFilter::try_from(ProjectListQuery {
            page: Some(i64::MAX.to_string()),
            per_page: Some("100".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.page, MAX_PAGE);
        assert_eq!(filter.offset().unwrap(), (MAX_PAGE - 1) * 100);
    }

    #[test]
    fn overflowing_offset_is_a_bad_request() {
        let filter = ProjectFilter {
            status: None,
            skills: Vec::new(),
            min_budget: None,
            max_budget: None,
            before_deadline: None,
            after_deadline: None,
            page: i64::MAX,
            per_page: 100,
        };
        let err = filter.offset().unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "page is out of range"));
    }

    #[test]
    fn list_query_rejects_out_of_range_budget() {
        let err = ProjectFilter::try_from(ProjectListQuery {
            min_budget: Some("-5".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "minBudget must be a valid number"));
    }

    #[test]
    fn list_query_rejects_bad_budget() {
        let err = ProjectFilter::try_from(ProjectListQuery {
            max_budget: Some("cheap".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "maxBudget must be a valid number"));
    }
}
