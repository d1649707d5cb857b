//! Dashboard and public views, addressed by their path.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Projects,
    Skills,
    Contact,
    AdminLogin,
    Dashboard,
    ProjectsView,
    SkillsView,
    MessagesView,
    EducationView,
    ProfileView,
    ExperienceView,
    AddProject,
    AddSkill,
    AddEducation,
    AddExperience,
    EditProject(u64),
    EditSkill(u64),
    EditEducation(u64),
    EditExperience(u64),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Projects => "/projects".to_string(),
            Self::Skills => "/skills".to_string(),
            Self::Contact => "/contact".to_string(),
            Self::AdminLogin => "/admin-login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::ProjectsView => "/projects-view".to_string(),
            Self::SkillsView => "/skills-view".to_string(),
            Self::MessagesView => "/messages-view".to_string(),
            Self::EducationView => "/education-view".to_string(),
            Self::ProfileView => "/profile-view".to_string(),
            Self::ExperienceView => "/experience-view".to_string(),
            Self::AddProject => "/add-project".to_string(),
            Self::AddSkill => "/add-skill".to_string(),
            Self::AddEducation => "/add-education".to_string(),
            Self::AddExperience => "/add-experience".to_string(),
            Self::EditProject(id) => format!("/edit-project/{id}"),
            Self::EditSkill(id) => format!("/edit-skill/{id}"),
            Self::EditEducation(id) => format!("/edit-education/{id}"),
            Self::EditExperience(id) => format!("/edit-experience/{id}"),
        }
    }

    /// Resolves a path; a single trailing slash is ignored.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };

        let route = match path {
            "/" => Self::Home,
            "/projects" => Self::Projects,
            "/skills" => Self::Skills,
            "/contact" => Self::Contact,
            "/admin-login" => Self::AdminLogin,
            "/dashboard" => Self::Dashboard,
            "/projects-view" => Self::ProjectsView,
            "/skills-view" => Self::SkillsView,
            "/messages-view" => Self::MessagesView,
            "/education-view" => Self::EducationView,
            "/profile-view" => Self::ProfileView,
            "/experience-view" => Self::ExperienceView,
            "/add-project" => Self::AddProject,
            "/add-skill" => Self::AddSkill,
            "/add-education" => Self::AddEducation,
            "/add-experience" => Self::AddExperience,
            other => return Self::parse_edit(other),
        };
        Some(route)
    }

    fn parse_edit(path: &str) -> Option<Self> {
        let (prefix, id) = path.rsplit_once('/')?;
        let id = id.parse::<u64>().ok()?;
        match prefix {
            "/edit-project" => Some(Self::EditProject(id)),
            "/edit-skill" => Some(Self::EditSkill(id)),
            "/edit-education" => Some(Self::EditEducation(id)),
            "/edit-experience" => Some(Self::EditExperience(id)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_admin_only(&self) -> bool {
        !matches!(
            self,
            Self::Home | Self::Projects | Self::Skills | Self::Contact | Self::AdminLogin
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
