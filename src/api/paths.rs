//! REST paths of the portfolio API, relative to the configured base URL.

pub const PROJECTS: &str = "/api/portfolio/add/projects/";
pub const PROJECT_DETAIL: &str = "/api/portfolio/admin/projects/";

pub const SKILLS: &str = "/api/portfolio/skills/";
pub const SKILL_DETAIL: &str = "/api/portfolio/admin/skills/";

pub const EDUCATION: &str = "/api/portfolio/admin/education/";
pub const EDUCATION_DETAIL: &str = "/api/portfolio/admin/education/";

pub const EXPERIENCE: &str = "/api/portfolio/admin/experience/";
pub const EXPERIENCE_DETAIL: &str = "/api/portfolio/admin/experience/";

pub const MESSAGES: &str = "/api/portfolio/contact/messages/";
pub const MESSAGE_DELETE: &str = "/api/dashboard/contact/messages/delete/";

pub const CONTACT: &str = "/api/portfolio/contact/";

pub const PROFILE: &str = "/api/portfolio/profile/";
pub const PROFILE_DETAIL: &str = "/api/portfolio/profile/";

/// `{prefix}{id}/`
#[must_use]
pub fn detail(prefix: &str, id: u64) -> String {
    format!("{}/{id}/", prefix.trim_end_matches('/'))
}
