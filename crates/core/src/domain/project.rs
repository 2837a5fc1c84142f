use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project status is independent of the status of any claim filed against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    New,
    Active,
    Pending,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectRole {
    ProjectManager,
    QualityAnalytics,
    Developer,
    Tester,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user_id: UserId,
    pub project_role: ProjectRole,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Roster rule violations, reported at project edit time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RosterViolation {
    #[error("project must have exactly one Project Manager, found none")]
    MissingProjectManager,
    #[error("project must have exactly one Project Manager, found {count}")]
    MultipleProjectManagers { count: usize },
    #[error("project may have at most one Quality Analytics member, found {count}")]
    MultipleQualityAnalytics { count: usize },
}

impl Project {
    /// True when the whole `start..=end` range falls inside the project window.
    pub fn covers_range(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start >= self.start_date && end <= self.end_date
    }

    pub fn member(&self, user_id: &UserId) -> Option<&ProjectMember> {
        self.members.iter().find(|member| &member.user_id == user_id)
    }

    pub fn project_manager(&self) -> Option<&ProjectMember> {
        self.members.iter().find(|member| member.project_role == ProjectRole::ProjectManager)
    }

    /// Exactly one Project Manager, at most one Quality Analytics member.
    pub fn validate_roster(&self) -> Result<(), RosterViolation> {
        validate_roster(&self.members)
    }
}

/// Roster check usable on a member list before a project record exists.
pub fn validate_roster(members: &[ProjectMember]) -> Result<(), RosterViolation> {
    let managers = members
        .iter()
        .filter(|member| member.project_role == ProjectRole::ProjectManager)
        .count();
    match managers {
        0 => return Err(RosterViolation::MissingProjectManager),
        1 => {}
        count => return Err(RosterViolation::MultipleProjectManagers { count }),
    }

    let analysts = members
        .iter()
        .filter(|member| member.project_role == ProjectRole::QualityAnalytics)
        .count();
    if analysts > 1 {
        return Err(RosterViolation::MultipleQualityAnalytics { count: analysts });
    }

    Ok(())
}
