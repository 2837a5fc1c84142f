use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectId;
use crate::domain::user::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimId(pub String);

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claim lifecycle states. `Rejected`, `Canceled`, and `Paid` are terminal:
/// no action in the transition table leaves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimStatus {
    Draft,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Rejected,
    Canceled,
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingApproval => "Pending Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Canceled => "Canceled",
            Self::Paid => "Paid",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Canceled | Self::Paid)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending approval" | "pending-approval" | "pending" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "paid" => Ok(Self::Paid),
            other => Err(format!(
                "unknown claim status `{other}` (expected draft|pending approval|approved|rejected|canceled|paid)"
            )),
        }
    }
}

/// One entry of the append-only audit trail attached to a claim. Entries are
/// only ever pushed, in chronological order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub actor: UserId,
    pub entered_status: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    pub staff_id: UserId,
    /// The approver (project manager) assigned to this claim.
    pub approval_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,
    pub claim_name: String,
    pub project_id: ProjectId,
    pub claim_start_date: NaiveDate,
    pub claim_end_date: NaiveDate,
    /// Claimed hours. Invariant: `>= 1`.
    pub total_work_time: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    pub status: ClaimStatus,
    #[serde(default)]
    pub audit_trail: Vec<TrailEntry>,
    // Denormalized display fields supplied by backend joins. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_name: Option<String>,
    // Backend-owned timestamps, never client-mutated except through
    // confirmed transitions.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Field edits are only permitted while the claim is still a draft.
    pub fn is_editable(&self) -> bool {
        self.status == ClaimStatus::Draft
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.staff_id == user_id
    }

    /// Case-insensitive keyword match over the searchable text fields.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let mut haystacks = vec![self.claim_name.as_str()];
        if let Some(project_name) = &self.project_name {
            haystacks.push(project_name);
        }
        if let Some(staff_name) = &self.staff_name {
            haystacks.push(staff_name);
        }

        haystacks.iter().any(|text| text.to_lowercase().contains(&needle))
    }
}

/// Draft-only field updates. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_work_time: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ClaimUpdate {
    pub fn is_empty(&self) -> bool {
        self.claim_name.is_none()
            && self.claim_start_date.is_none()
            && self.claim_end_date.is_none()
            && self.total_work_time.is_none()
            && self.remark.is_none()
    }
}
