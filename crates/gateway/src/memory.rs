use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate};
use claimdesk_core::domain::project::{Project, ProjectId};
use claimdesk_core::paging::{filter_claims, paginate, Page, PageRequest};
use claimdesk_core::validation::{merged_draft, validate_against_project, validate_draft, NewClaim};
use claimdesk_core::workflow::engine::WorkflowEngine;
use claimdesk_core::workflow::rules::{Actor, ClaimAction, TransitionError};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{ClaimFilter, ClaimsGateway, SearchScope};

/// Test double standing in for the backend. It enforces the same transition
/// and membership rules the real backend does, so controller tests exercise
/// genuine server-side rejections (stale copies, non-members, bad batches).
#[derive(Default)]
pub struct InMemoryGateway {
    claims: Mutex<BTreeMap<ClaimId, Claim>>,
    projects: Mutex<BTreeMap<ProjectId, Project>>,
    failing: Mutex<HashSet<ClaimId>>,
    next_claim: AtomicU64,
    requests: AtomicU64,
    engine: WorkflowEngine,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, project: Project) {
        self.lock_projects().insert(project.id.clone(), project);
    }

    pub fn insert_claim(&self, claim: Claim) {
        self.lock_claims().insert(claim.id.clone(), claim);
    }

    /// Makes every transition on `id` fail with a backend error, for
    /// batch partial-failure tests.
    pub fn inject_transition_failure(&self, id: &ClaimId) {
        match self.failing.lock() {
            Ok(mut failing) => failing.insert(id.clone()),
            Err(poisoned) => poisoned.into_inner().insert(id.clone()),
        };
    }

    pub fn stored_claim(&self, id: &ClaimId) -> Option<Claim> {
        self.lock_claims().get(id).cloned()
    }

    /// Number of gateway calls observed, used to assert that client-side
    /// validation failures never reach the network.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn lock_claims(&self) -> std::sync::MutexGuard<'_, BTreeMap<ClaimId, Claim>> {
        match self.claims.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_projects(&self) -> std::sync::MutexGuard<'_, BTreeMap<ProjectId, Project>> {
        match self.projects.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn is_failing(&self, id: &ClaimId) -> bool {
        match self.failing.lock() {
            Ok(failing) => failing.contains(id),
            Err(poisoned) => poisoned.into_inner().contains(id),
        }
    }
}

#[async_trait]
impl ClaimsGateway for InMemoryGateway {
    async fn fetch_claim(&self, id: &ClaimId) -> GatewayResult<Claim> {
        self.record_request();
        self.lock_claims()
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("claim {id}")))
    }

    async fn fetch_project(&self, id: &ProjectId) -> GatewayResult<Project> {
        self.record_request();
        self.lock_projects()
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("project {id}")))
    }

    async fn create_claim(&self, draft: &NewClaim, actor: &Actor) -> GatewayResult<Claim> {
        self.record_request();

        let projects = self.lock_projects();
        let project = projects
            .get(&draft.project_id)
            .ok_or_else(|| GatewayError::NotFound(format!("project {}", draft.project_id)))?;
        if project.member(&actor.user_id).is_none() {
            return Err(GatewayError::Conflict(format!(
                "user {} is not a member of project {}",
                actor.user_id, project.id
            )));
        }
        let project_name = project.project_name.clone();
        drop(projects);

        let seq = self.next_claim.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let claim = Claim {
            id: ClaimId(format!("CLM-{seq:04}")),
            staff_id: actor.user_id.clone(),
            approval_id: draft.approval_id.clone(),
            updated_by: None,
            claim_name: draft.claim_name.clone(),
            project_id: draft.project_id.clone(),
            claim_start_date: draft.claim_start_date,
            claim_end_date: draft.claim_end_date,
            total_work_time: draft.total_work_time,
            remark: draft.remark.clone(),
            status: ClaimStatus::Draft,
            audit_trail: Vec::new(),
            staff_name: None,
            staff_email: None,
            project_name: Some(project_name),
            approver_name: None,
            created_at: now,
            updated_at: now,
        };

        self.lock_claims().insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }

    async fn update_claim(
        &self,
        id: &ClaimId,
        fields: &ClaimUpdate,
        actor: &Actor,
    ) -> GatewayResult<Claim> {
        self.record_request();

        let mut claims = self.lock_claims();
        let claim =
            claims.get_mut(id).ok_or_else(|| GatewayError::NotFound(format!("claim {id}")))?;

        if !claim.is_owned_by(&actor.user_id) {
            return Err(GatewayError::Forbidden(
                "only the claim owner may edit this claim".to_string(),
            ));
        }
        if !claim.is_editable() {
            return Err(GatewayError::Conflict(format!(
                "claim {id} is no longer editable in status {}",
                claim.status
            )));
        }

        // The backend revalidates edits against the same creation rules.
        let merged = merged_draft(claim, fields);
        validate_draft(&merged)
            .map_err(|error| GatewayError::Validation(error.to_string()))?;
        if let Some(project) = self.lock_projects().get(&claim.project_id) {
            validate_against_project(&merged, project)
                .map_err(|error| GatewayError::Validation(error.to_string()))?;
        }

        if let Some(claim_name) = &fields.claim_name {
            claim.claim_name = claim_name.clone();
        }
        if let Some(start) = fields.claim_start_date {
            claim.claim_start_date = start;
        }
        if let Some(end) = fields.claim_end_date {
            claim.claim_end_date = end;
        }
        if let Some(hours) = fields.total_work_time {
            claim.total_work_time = hours;
        }
        if let Some(remark) = &fields.remark {
            claim.remark = Some(remark.clone());
        }
        claim.updated_at = Utc::now();

        Ok(claim.clone())
    }

    async fn transition_claim(
        &self,
        id: &ClaimId,
        action: ClaimAction,
        actor: &Actor,
        comment: Option<String>,
    ) -> GatewayResult<Claim> {
        self.record_request();

        if self.is_failing(id) {
            return Err(GatewayError::Api(format!("injected backend failure for claim {id}")));
        }

        let mut claims = self.lock_claims();
        let claim =
            claims.get_mut(id).ok_or_else(|| GatewayError::NotFound(format!("claim {id}")))?;

        self.engine.apply(claim, action, actor, comment).map_err(|error| match error {
            TransitionError::Unauthorized { .. } => GatewayError::Forbidden(error.to_string()),
            TransitionError::InvalidTransition { .. } => GatewayError::Conflict(error.to_string()),
        })?;

        Ok(claim.clone())
    }

    async fn search_claims(
        &self,
        scope: &SearchScope,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> GatewayResult<Page<Claim>> {
        self.record_request();

        let claims: Vec<Claim> = self
            .lock_claims()
            .values()
            .filter(|claim| match scope {
                SearchScope::Claimer(staff_id) => &claim.staff_id == staff_id,
                SearchScope::Approver(approver_id) => &claim.approval_id == approver_id,
                SearchScope::Finance | SearchScope::Admin => true,
            })
            .cloned()
            .collect();

        let filtered = filter_claims(&claims, filter.status, filter.keyword.as_deref());
        Ok(paginate(&filtered, page))
    }
}
