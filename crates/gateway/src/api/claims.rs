use async_trait::async_trait;
use serde::Serialize;

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate};
use claimdesk_core::domain::project::{Project, ProjectId};
use claimdesk_core::paging::{filter_claims, paginate, Page, PageRequest};
use claimdesk_core::validation::NewClaim;
use claimdesk_core::workflow::rules::{Actor, ClaimAction};

use crate::error::GatewayResult;
use crate::http::HttpGateway;
use crate::traits::{ClaimFilter, ClaimsGateway, SearchScope};

/// Page size used when a role's endpoint cannot filter by status server-side
/// and the collection has to be fetched for client-side filtering. Claim
/// volumes per approver or finance queue stay far below this.
const FALLBACK_FETCH_SIZE: u32 = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    #[serde(flatten)]
    page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ClaimStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionBody {
    action: ClaimAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

fn search_path(scope: &SearchScope) -> &'static str {
    match scope {
        SearchScope::Claimer(_) => "/claims/search/claimer",
        SearchScope::Approver(_) => "/claims/search/approver",
        SearchScope::Finance => "/claims/search/finance",
        SearchScope::Admin => "/claims/search/admin",
    }
}

// The backend resolves the caller from the bearer token, so the actor
// argument is not sent on the wire; it exists for the in-memory double.
#[async_trait]
impl ClaimsGateway for HttpGateway {
    async fn fetch_claim(&self, id: &ClaimId) -> GatewayResult<Claim> {
        self.get(&format!("/claims/{id}")).await
    }

    async fn fetch_project(&self, id: &ProjectId) -> GatewayResult<Project> {
        self.get(&format!("/projects/{id}")).await
    }

    async fn create_claim(&self, draft: &NewClaim, _actor: &Actor) -> GatewayResult<Claim> {
        self.post("/claims", draft).await
    }

    async fn update_claim(
        &self,
        id: &ClaimId,
        fields: &ClaimUpdate,
        _actor: &Actor,
    ) -> GatewayResult<Claim> {
        self.put(&format!("/claims/{id}"), fields).await
    }

    async fn transition_claim(
        &self,
        id: &ClaimId,
        action: ClaimAction,
        _actor: &Actor,
        comment: Option<String>,
    ) -> GatewayResult<Claim> {
        let body = TransitionBody { action, comment };
        self.post(&format!("/claims/{id}/status"), &body).await
    }

    async fn search_claims(
        &self,
        scope: &SearchScope,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> GatewayResult<Page<Claim>> {
        let path = search_path(scope);

        // Status filtering falls back to the client when the role's endpoint
        // does not accept a status parameter.
        if filter.status.is_some() && !scope.supports_server_status_filter() {
            let body = SearchBody {
                page: PageRequest { page_num: 1, page_size: FALLBACK_FETCH_SIZE },
                keyword: filter.keyword.as_deref(),
                status: None,
            };
            let fetched: Page<Claim> = self.post(path, &body).await?;
            let matching = filter_claims(&fetched.page_data, filter.status, None);
            return Ok(paginate(&matching, page));
        }

        let body =
            SearchBody { page, keyword: filter.keyword.as_deref(), status: filter.status };
        self.post(path, &body).await
    }
}
