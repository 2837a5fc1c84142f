use chrono::Utc;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::claim::{Claim, ClaimStatus, TrailEntry};
use crate::workflow::rules::{next_status, Actor, ClaimAction, TransitionError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub action: ClaimAction,
}

/// Applies claim transitions in place. The backend holds the authoritative
/// copy; this engine runs on records the backend returned (or, in the fake
/// gateway, on the stored records themselves).
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkflowEngine;

impl WorkflowEngine {
    /// Validates the transition and, only on success, moves the claim to the
    /// new status and appends exactly one trail entry. A failed transition
    /// leaves the claim untouched.
    pub fn apply(
        &self,
        claim: &mut Claim,
        action: ClaimAction,
        actor: &Actor,
        comment: Option<String>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let to = next_status(claim, action, actor)?;
        let from = claim.status;
        let now = Utc::now();

        claim.status = to;
        claim.audit_trail.push(TrailEntry {
            actor: actor.user_id.clone(),
            entered_status: to,
            comment,
            recorded_at: now,
        });
        if action == ClaimAction::MarkPaid {
            claim.updated_by = Some(actor.user_id.clone());
        }
        claim.updated_at = now;

        Ok(TransitionOutcome { from, to, action })
    }

    pub fn apply_with_audit<S>(
        &self,
        claim: &mut Claim,
        action: ClaimAction,
        actor: &Actor,
        comment: Option<String>,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, TransitionError>
    where
        S: AuditSink,
    {
        let result = self.apply(claim, action, actor, comment);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        Some(claim.id.clone()),
                        audit.correlation_id.clone(),
                        "workflow.transition_applied",
                        AuditCategory::Workflow,
                        audit.actor.clone(),
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.as_str())
                    .with_metadata("to", outcome.to.as_str())
                    .with_metadata("action", outcome.action.as_str()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        Some(claim.id.clone()),
                        audit.correlation_id.clone(),
                        "workflow.transition_rejected",
                        AuditCategory::Workflow,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}
