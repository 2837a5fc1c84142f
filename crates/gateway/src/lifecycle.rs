use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate};
use claimdesk_core::errors::{ApplicationError, DomainError};
use claimdesk_core::validation::{
    merged_draft, validate_against_project, validate_draft, NewClaim, ValidationError,
};
use claimdesk_core::workflow::rules::{next_status, Actor, ClaimAction, TransitionError};

use crate::error::GatewayError;
use crate::traits::ClaimsGateway;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("claim {0} belongs to a different staff member")]
    NotOwner(ClaimId),
    #[error("claim {id} cannot be edited in status {status}")]
    NotEditable { id: ClaimId, status: ClaimStatus },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Frontends that speak the layered error taxonomy get the domain/remote
/// split for free; ownership and editability failures are invariant
/// violations rather than transitions.
impl From<LifecycleError> for ApplicationError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::Validation(error) => {
                ApplicationError::Domain(DomainError::Validation(error))
            }
            LifecycleError::Transition(error) => {
                ApplicationError::Domain(DomainError::Transition(error))
            }
            LifecycleError::NotOwner(_) | LifecycleError::NotEditable { .. } => {
                ApplicationError::Domain(DomainError::InvariantViolation(error.to_string()))
            }
            LifecycleError::Gateway(error) => ApplicationError::Remote(error.to_string()),
        }
    }
}

/// One failed entry of a batch payment run.
#[derive(Debug)]
pub struct BatchFailure {
    pub claim_id: ClaimId,
    pub reason: String,
}

/// Outcome of a best-effort batch: every claim is attempted, successes are
/// kept even when siblings fail.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<ClaimId>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives a claim through its lifecycle on behalf of one acting user. Every
/// transition is gated locally first, then confirmed against the backend's
/// copy, so a stale local record cannot push a claim into an illegal status.
pub struct ClaimLifecycle<G> {
    gateway: Arc<G>,
    actor: Actor,
}

impl<G: ClaimsGateway> ClaimLifecycle<G> {
    pub fn new(gateway: Arc<G>, actor: Actor) -> Self {
        Self { gateway, actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Creates a draft claim. Field-level validation runs before any gateway
    /// call; the project window check needs the project record and runs after
    /// a single fetch.
    pub async fn create_claim(&self, draft: &NewClaim) -> Result<Claim, LifecycleError> {
        validate_draft(draft)?;

        let project = self.gateway.fetch_project(&draft.project_id).await?;
        validate_against_project(draft, &project)?;

        let claim = self.gateway.create_claim(draft, &self.actor).await?;
        info!(claim_id = %claim.id, project_id = %claim.project_id, "claim created");
        Ok(claim)
    }

    /// Draft-only field edits by the claim owner. The record as it would look
    /// after the edit is held to the same constraints as claim creation.
    pub async fn update_claim(
        &self,
        id: &ClaimId,
        fields: &ClaimUpdate,
    ) -> Result<Claim, LifecycleError> {
        let current = self.gateway.fetch_claim(id).await?;
        if !current.is_owned_by(&self.actor.user_id) {
            return Err(LifecycleError::NotOwner(id.clone()));
        }
        if !current.is_editable() {
            return Err(LifecycleError::NotEditable { id: id.clone(), status: current.status });
        }
        if fields.is_empty() {
            return Ok(current);
        }

        let merged = merged_draft(&current, fields);
        validate_draft(&merged)?;
        if fields.claim_start_date.is_some() || fields.claim_end_date.is_some() {
            let project = self.gateway.fetch_project(&current.project_id).await?;
            validate_against_project(&merged, &project)?;
        }

        Ok(self.gateway.update_claim(id, fields, &self.actor).await?)
    }

    pub async fn send_for_approval(&self, id: &ClaimId) -> Result<Claim, LifecycleError> {
        self.transition(id, ClaimAction::SendForApproval, None).await
    }

    pub async fn cancel(&self, id: &ClaimId, comment: Option<String>) -> Result<Claim, LifecycleError> {
        self.transition(id, ClaimAction::Cancel, comment).await
    }

    pub async fn approve(&self, id: &ClaimId, comment: Option<String>) -> Result<Claim, LifecycleError> {
        self.transition(id, ClaimAction::Approve, comment).await
    }

    pub async fn reject(&self, id: &ClaimId, comment: Option<String>) -> Result<Claim, LifecycleError> {
        self.transition(id, ClaimAction::Reject, comment).await
    }

    pub async fn mark_paid(&self, id: &ClaimId) -> Result<Claim, LifecycleError> {
        self.transition(id, ClaimAction::MarkPaid, None).await
    }

    /// Pays every approved claim in the batch, best effort. Failures are
    /// collected per claim and never abort the remaining entries.
    pub async fn mark_paid_batch(&self, ids: &[ClaimId]) -> BatchOutcome {
        let attempts = ids.iter().map(|id| async move { (id.clone(), self.mark_paid(id).await) });

        let mut outcome = BatchOutcome::default();
        for (claim_id, result) in join_all(attempts).await {
            match result {
                Ok(_) => outcome.succeeded.push(claim_id),
                Err(error) => {
                    warn!(claim_id = %claim_id, %error, "batch payment entry failed");
                    outcome.failed.push(BatchFailure { claim_id, reason: error.to_string() });
                }
            }
        }

        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "batch payment finished"
        );
        outcome
    }

    /// Shared transition path: fetch the latest copy, gate locally, then ask
    /// the backend. The returned record is the backend's confirmed state.
    async fn transition(
        &self,
        id: &ClaimId,
        action: ClaimAction,
        comment: Option<String>,
    ) -> Result<Claim, LifecycleError> {
        let current = self.gateway.fetch_claim(id).await?;
        next_status(&current, action, &self.actor)?;

        let confirmed = self.gateway.transition_claim(id, action, &self.actor, comment).await?;
        info!(claim_id = %id, action = %action, status = %confirmed.status, "claim transitioned");
        Ok(confirmed)
    }
}
