use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate};
use claimdesk_core::domain::project::{Project, ProjectId};
use claimdesk_core::domain::user::UserId;
use claimdesk_core::paging::{Page, PageRequest};
use claimdesk_core::validation::NewClaim;
use claimdesk_core::workflow::rules::{Actor, ClaimAction};

use crate::error::GatewayResult;

/// Which role-scoped search variant a list view uses. The backend exposes a
/// separate endpoint per caller role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchScope {
    /// Claims created by this staff member.
    Claimer(UserId),
    /// Claims assigned to this approver.
    Approver(UserId),
    /// Claims visible to finance.
    Finance,
    /// Unrestricted admin search.
    Admin,
}

impl SearchScope {
    /// The approver and finance variants accept no status parameter; their
    /// status filtering happens client-side over the fetched collection.
    pub fn supports_server_status_filter(&self) -> bool {
        matches!(self, Self::Claimer(_) | Self::Admin)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClaimStatus>,
}

/// The contract between the workflow layer and the backend. One contract,
/// two implementations: `HttpGateway` for production and `InMemoryGateway`
/// for tests.
#[async_trait]
pub trait ClaimsGateway: Send + Sync {
    async fn fetch_claim(&self, id: &ClaimId) -> GatewayResult<Claim>;

    async fn fetch_project(&self, id: &ProjectId) -> GatewayResult<Project>;

    /// Creates a new claim in `Draft` on behalf of the acting staff member.
    async fn create_claim(&self, draft: &NewClaim, actor: &Actor) -> GatewayResult<Claim>;

    /// Draft-only field edits.
    async fn update_claim(
        &self,
        id: &ClaimId,
        fields: &ClaimUpdate,
        actor: &Actor,
    ) -> GatewayResult<Claim>;

    /// Asks the backend to perform a status transition. The backend revalidates
    /// against its own copy, so a stale client observes the server's rejection
    /// instead of silently succeeding.
    async fn transition_claim(
        &self,
        id: &ClaimId,
        action: ClaimAction,
        actor: &Actor,
        comment: Option<String>,
    ) -> GatewayResult<Claim>;

    async fn search_claims(
        &self,
        scope: &SearchScope,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> GatewayResult<Page<Claim>>;
}
