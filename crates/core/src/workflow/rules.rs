use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::claim::{Claim, ClaimStatus};
use crate::domain::user::{RoleCode, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimAction {
    SendForApproval,
    Cancel,
    Approve,
    Reject,
    MarkPaid,
}

impl ClaimAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendForApproval => "send-for-approval",
            Self::Cancel => "cancel",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::MarkPaid => "mark-paid",
        }
    }
}

impl std::fmt::Display for ClaimAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is attempting the action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: RoleCode,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: RoleCode) -> Self {
        Self { user_id: UserId(user_id.into()), role }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("user `{user_id}` is not authorized to {action} this claim")]
    Unauthorized { user_id: UserId, action: ClaimAction },
    #[error("cannot {action} a claim in status {from}")]
    InvalidTransition { from: ClaimStatus, action: ClaimAction },
}

/// The single source of truth for the claim status table:
///
/// | current          | action            | actor             | next             |
/// |------------------|-------------------|-------------------|------------------|
/// | Draft            | send-for-approval | claim owner       | Pending Approval |
/// | Draft            | cancel            | claim owner       | Canceled         |
/// | Pending Approval | approve           | assigned approver | Approved         |
/// | Pending Approval | reject            | assigned approver | Rejected         |
/// | Approved         | mark-paid         | finance role      | Paid             |
///
/// Authorization is checked before state validity, so an actor who may not
/// touch the claim always sees `Unauthorized` and never learns whether the
/// transition itself would have been legal. The claim is never mutated here;
/// callers apply the returned status only after backend confirmation.
pub fn next_status(
    claim: &Claim,
    action: ClaimAction,
    actor: &Actor,
) -> Result<ClaimStatus, TransitionError> {
    use ClaimAction::{Approve, Cancel, MarkPaid, Reject, SendForApproval};

    let authorized = match action {
        SendForApproval | Cancel => claim.staff_id == actor.user_id,
        Approve | Reject => claim.approval_id == actor.user_id,
        MarkPaid => actor.role == RoleCode::Finance,
    };
    if !authorized {
        return Err(TransitionError::Unauthorized { user_id: actor.user_id.clone(), action });
    }

    match (claim.status, action) {
        (ClaimStatus::Draft, SendForApproval) => Ok(ClaimStatus::PendingApproval),
        (ClaimStatus::Draft, Cancel) => Ok(ClaimStatus::Canceled),
        (ClaimStatus::PendingApproval, Approve) => Ok(ClaimStatus::Approved),
        (ClaimStatus::PendingApproval, Reject) => Ok(ClaimStatus::Rejected),
        (ClaimStatus::Approved, MarkPaid) => Ok(ClaimStatus::Paid),
        (from, action) => Err(TransitionError::InvalidTransition { from, action }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{next_status, Actor, ClaimAction, TransitionError};
    use crate::domain::claim::{Claim, ClaimId, ClaimStatus};
    use crate::domain::project::ProjectId;
    use crate::domain::user::{RoleCode, UserId};

    fn claim(status: ClaimStatus) -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId("CLM-1".to_string()),
            staff_id: UserId("u-owner".to_string()),
            approval_id: UserId("u-approver".to_string()),
            updated_by: None,
            claim_name: "Release weekend".to_string(),
            project_id: ProjectId("P-1".to_string()),
            claim_start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            claim_end_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            total_work_time: Decimal::new(8, 0),
            remark: None,
            status,
            audit_trail: Vec::new(),
            staff_name: None,
            staff_email: None,
            project_name: None,
            approver_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn owner() -> Actor {
        Actor::new("u-owner", RoleCode::Member)
    }

    fn approver() -> Actor {
        Actor::new("u-approver", RoleCode::Approver)
    }

    fn finance() -> Actor {
        Actor::new("u-finance", RoleCode::Finance)
    }

    #[test]
    fn every_row_of_the_table_is_accepted() {
        let cases = [
            (ClaimStatus::Draft, ClaimAction::SendForApproval, owner(), ClaimStatus::PendingApproval),
            (ClaimStatus::Draft, ClaimAction::Cancel, owner(), ClaimStatus::Canceled),
            (ClaimStatus::PendingApproval, ClaimAction::Approve, approver(), ClaimStatus::Approved),
            (ClaimStatus::PendingApproval, ClaimAction::Reject, approver(), ClaimStatus::Rejected),
            (ClaimStatus::Approved, ClaimAction::MarkPaid, finance(), ClaimStatus::Paid),
        ];

        for (from, action, actor, expected) in cases {
            let claim = claim(from);
            assert_eq!(next_status(&claim, action, &actor), Ok(expected), "{from:?} + {action}");
        }
    }

    #[test]
    fn every_other_state_action_pair_is_rejected() {
        let all_statuses = [
            ClaimStatus::Draft,
            ClaimStatus::PendingApproval,
            ClaimStatus::Approved,
            ClaimStatus::Rejected,
            ClaimStatus::Canceled,
            ClaimStatus::Paid,
        ];
        let rows = [
            (ClaimStatus::Draft, ClaimAction::SendForApproval),
            (ClaimStatus::Draft, ClaimAction::Cancel),
            (ClaimStatus::PendingApproval, ClaimAction::Approve),
            (ClaimStatus::PendingApproval, ClaimAction::Reject),
            (ClaimStatus::Approved, ClaimAction::MarkPaid),
        ];

        for status in all_statuses {
            for action in [
                ClaimAction::SendForApproval,
                ClaimAction::Cancel,
                ClaimAction::Approve,
                ClaimAction::Reject,
                ClaimAction::MarkPaid,
            ] {
                if rows.contains(&(status, action)) {
                    continue;
                }
                let claim = claim(status);
                let actor = match action {
                    ClaimAction::SendForApproval | ClaimAction::Cancel => owner(),
                    ClaimAction::Approve | ClaimAction::Reject => approver(),
                    ClaimAction::MarkPaid => finance(),
                };
                let error = next_status(&claim, action, &actor)
                    .expect_err("pair outside the table must fail");
                assert_eq!(
                    error,
                    TransitionError::InvalidTransition { from: status, action },
                    "{status:?} + {action}"
                );
                // Rejection must not have touched the claim.
                assert_eq!(claim.status, status);
            }
        }
    }

    #[test]
    fn non_owner_cannot_send_or_cancel() {
        let claim = claim(ClaimStatus::Draft);
        let stranger = Actor::new("u-other", RoleCode::Member);

        for action in [ClaimAction::SendForApproval, ClaimAction::Cancel] {
            let error = next_status(&claim, action, &stranger).expect_err("must be unauthorized");
            assert!(matches!(error, TransitionError::Unauthorized { .. }));
        }
    }

    #[test]
    fn non_assigned_approver_cannot_approve() {
        let claim = claim(ClaimStatus::PendingApproval);
        let other_pm = Actor::new("u-other-pm", RoleCode::Approver);

        let error = next_status(&claim, ClaimAction::Approve, &other_pm)
            .expect_err("must be unauthorized");
        assert_eq!(
            error,
            TransitionError::Unauthorized {
                user_id: UserId("u-other-pm".to_string()),
                action: ClaimAction::Approve,
            }
        );
    }

    #[test]
    fn non_finance_cannot_mark_paid() {
        let claim = claim(ClaimStatus::Approved);
        let admin = Actor::new("u-admin", RoleCode::Admin);

        let error =
            next_status(&claim, ClaimAction::MarkPaid, &admin).expect_err("must be unauthorized");
        assert!(matches!(error, TransitionError::Unauthorized { .. }));
    }

    #[test]
    fn authorization_is_checked_before_state() {
        // Wrong actor on a claim that is also in the wrong state: the error
        // must still be Unauthorized, not InvalidTransition.
        let claim = claim(ClaimStatus::Paid);
        let stranger = Actor::new("u-other", RoleCode::Member);

        let error = next_status(&claim, ClaimAction::SendForApproval, &stranger)
            .expect_err("must fail");
        assert!(matches!(error, TransitionError::Unauthorized { .. }));
    }
}
