use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use claimdesk_core::domain::project::{validate_roster, Project, ProjectId, ProjectMember};
use claimdesk_core::paging::{Page, PageRequest};

use crate::error::{GatewayError, GatewayResult};
use crate::http::HttpGateway;

/// Create/update payload for a project. The roster rule is checked before
/// the request leaves the client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub members: Vec<ProjectMember>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSearchBody<'a> {
    #[serde(flatten)]
    page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
}

impl HttpGateway {
    pub async fn create_project(&self, draft: &ProjectDraft) -> GatewayResult<Project> {
        validate_roster(&draft.members)
            .map_err(|violation| GatewayError::Validation(violation.to_string()))?;
        self.post("/projects", draft).await
    }

    pub async fn update_project(
        &self,
        id: &ProjectId,
        draft: &ProjectDraft,
    ) -> GatewayResult<Project> {
        validate_roster(&draft.members)
            .map_err(|violation| GatewayError::Validation(violation.to_string()))?;
        self.put(&format!("/projects/{id}"), draft).await
    }

    pub async fn search_projects(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> GatewayResult<Page<Project>> {
        let body = ProjectSearchBody { page, keyword };
        self.post("/projects/search", &body).await
    }
}
