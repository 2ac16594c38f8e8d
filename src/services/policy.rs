//! Authorization rules for every resource, in one place.
//!
//! Admins may read, update and delete anything. Clients act on the projects
//! they own and on the applications and reviews attached to them. Students
//! see open projects and manage their own applications.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::application::Application;
use crate::models::project::{Project, ProjectStatus};
use crate::models::review::Review;
use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
    /// List the applications submitted to a project.
    ListApplications,
    /// Approve or reject an application on a project.
    DecideApplication,
    /// Write a review for a student on a project.
    WriteReview,
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Project(&'a Project),
    Application {
        application: &'a Application,
        project_owner: Uuid,
    },
    Review(&'a Review),
    User(Uuid),
}

fn not_authorized() -> Error {
    Error::Forbidden("Not authorized".into())
}

pub fn authorize(actor: &AuthUser, action: Action, resource: Resource<'_>) -> Result<()> {
    let allowed = match (resource, action) {
        (Resource::Project(project), Action::Read) => {
            if actor.role == Role::Student && project.status != ProjectStatus::Open {
                return Err(Error::Forbidden(
                    "Students can only view open projects".into(),
                ));
            }
            actor.is_admin() || actor.role == Role::Student || project.created_by == actor.id
        }
        (Resource::Project(project), Action::Update | Action::Delete | Action::ListApplications) => {
            actor.is_admin() || project.created_by == actor.id
        }
        (Resource::Project(project), Action::DecideApplication | Action::WriteReview) => {
            project.created_by == actor.id
        }
        (
            Resource::Application {
                application,
                project_owner,
            },
            Action::Read,
        ) => actor.is_admin() || application.student_id == actor.id || project_owner == actor.id,
        (Resource::Application { application, .. }, Action::Delete) => {
            application.student_id == actor.id
        }
        (Resource::Application { project_owner, .. }, Action::DecideApplication) => {
            project_owner == actor.id
        }
        (Resource::Review(_), Action::Read) => true,
        (Resource::Review(review), Action::Update | Action::Delete) => review.reviewer_id == actor.id,
        (Resource::User(_), Action::Read) => true,
        (Resource::User(id), Action::Update | Action::Delete) => actor.is_admin() || id == actor.id,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(not_authorized())
    }
}

pub fn require_role(actor: &AuthUser, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(not_authorized())
    }
}

/// Which projects a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    All,
    OwnedBy(Uuid),
    OpenOnly,
}

pub fn project_list_scope(actor: &AuthUser, requested: Option<ProjectStatus>) -> Result<ProjectScope> {
    match actor.role {
        Role::Admin => Ok(ProjectScope::All),
        Role::Client => Ok(ProjectScope::OwnedBy(actor.id)),
        Role::Student => match requested {
            None | Some(ProjectStatus::Open) => Ok(ProjectScope::OpenOnly),
            Some(_) => Err(Error::Forbidden(
                "Students can only view open projects".into(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn actor(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            role,
        }
    }

    fn project(owner: Uuid, status: ProjectStatus) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Site".into(),
            description: "Build".into(),
            budget: Decimal::from(100),
            deadline: Utc::now(),
            required_skills: vec!["rust".into()],
            status,
            created_by: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application(student: Uuid) -> Application {
        Application {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            student_id: student,
            resume_url: "/uploads/resumes/a.pdf".into(),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn other_clients_cannot_touch_a_project() {
        let owner = actor(Role::Client);
        let stranger = actor(Role::Client);
        let p = project(owner.id, ProjectStatus::Open);
        for action in [Action::Read, Action::Update, Action::Delete] {
            assert!(authorize(&owner, action, Resource::Project(&p)).is_ok());
            let err = authorize(&stranger, action, Resource::Project(&p)).unwrap_err();
            assert!(matches!(err, Error::Forbidden(_)));
        }
    }

    #[test]
    fn students_read_only_open_projects() {
        let student = actor(Role::Student);
        let owner = Uuid::new_v4();
        let open = project(owner, ProjectStatus::Open);
        let done = project(owner, ProjectStatus::Completed);
        assert!(authorize(&student, Action::Read, Resource::Project(&open)).is_ok());
        assert!(authorize(&student, Action::Read, Resource::Project(&done)).is_err());
        assert!(authorize(&student, Action::Update, Resource::Project(&open)).is_err());
    }

    #[test]
    fn admin_may_manage_but_not_decide_applications() {
        let admin = actor(Role::Admin);
        let p = project(Uuid::new_v4(), ProjectStatus::Open);
        assert!(authorize(&admin, Action::Delete, Resource::Project(&p)).is_ok());
        assert!(authorize(&admin, Action::ListApplications, Resource::Project(&p)).is_ok());
        assert!(authorize(&admin, Action::DecideApplication, Resource::Project(&p)).is_err());
        assert!(authorize(&admin, Action::WriteReview, Resource::Project(&p)).is_err());
    }

    #[test]
    fn only_the_applicant_deletes_an_application() {
        let student = actor(Role::Student);
        let owner = actor(Role::Client);
        let app = application(student.id);
        let res = Resource::Application {
            application: &app,
            project_owner: owner.id,
        };
        assert!(authorize(&student, Action::Delete, res).is_ok());
        assert!(authorize(&owner, Action::Delete, res).is_err());
        assert!(authorize(&owner, Action::Read, res).is_ok());
        assert!(authorize(&owner, Action::DecideApplication, res).is_ok());
        assert!(authorize(&student, Action::DecideApplication, res).is_err());
    }

    #[test]
    fn users_delete_themselves_and_admins_delete_anyone() {
        let user = actor(Role::Student);
        let admin = actor(Role::Admin);
        let other = Uuid::new_v4();
        assert!(authorize(&user, Action::Delete, Resource::User(user.id)).is_ok());
        assert!(authorize(&user, Action::Delete, Resource::User(other)).is_err());
        assert!(authorize(&admin, Action::Delete, Resource::User(other)).is_ok());
    }

    #[test]
    fn list_scope_follows_role() {
        let client = actor(Role::Client);
        assert_eq!(
            project_list_scope(&client, None).unwrap(),
            ProjectScope::OwnedBy(client.id)
        );
        let student = actor(Role::Student);
        assert_eq!(
            project_list_scope(&student, Some(ProjectStatus::Open)).unwrap(),
            ProjectScope::OpenOnly
        );
        assert!(project_list_scope(&student, Some(ProjectStatus::Completed)).is_err());
        assert_eq!(
            project_list_scope(&actor(Role::Admin), Some(ProjectStatus::Cancelled)).unwrap(),
            ProjectScope::All
        );
    }
}
