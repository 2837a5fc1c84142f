use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::claim::{Claim, ClaimUpdate};
use crate::domain::project::{Project, ProjectId};
use crate::domain::user::UserId;

/// Fields a claimer supplies when creating a draft claim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaim {
    pub claim_name: String,
    pub project_id: ProjectId,
    pub approval_id: UserId,
    pub claim_start_date: NaiveDate,
    pub claim_end_date: NaiveDate,
    pub total_work_time: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// All offending fields are collected in one pass so the caller can surface
/// every problem at once instead of drip-feeding them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("claim validation failed: {}", summary(violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.violations.iter().map(|violation| violation.field).collect()
    }
}

fn summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Local-only constraints. Checked before any network round trip.
pub fn validate_draft(draft: &NewClaim) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if draft.claim_name.trim().is_empty() {
        violations.push(FieldViolation {
            field: "claim_name",
            message: "claim name is required".to_string(),
        });
    }
    if draft.project_id.0.trim().is_empty() {
        violations.push(FieldViolation {
            field: "project_id",
            message: "a project must be selected".to_string(),
        });
    }
    if draft.approval_id.0.trim().is_empty() {
        violations.push(FieldViolation {
            field: "approval_id",
            message: "an approver must be assigned".to_string(),
        });
    }
    if draft.claim_end_date < draft.claim_start_date {
        violations.push(FieldViolation {
            field: "claim_end_date",
            message: "end date must not be before start date".to_string(),
        });
    }
    if draft.total_work_time < Decimal::ONE {
        violations.push(FieldViolation {
            field: "total_work_time",
            message: "total work time must be at least 1 hour".to_string(),
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

/// Constraints that need the referenced project: the claim's date range must
/// fall inside the project window.
pub fn validate_against_project(draft: &NewClaim, project: &Project) -> Result<(), ValidationError> {
    if project.covers_range(draft.claim_start_date, draft.claim_end_date) {
        return Ok(());
    }

    Err(ValidationError {
        violations: vec![FieldViolation {
            field: "claim_start_date",
            message: format!(
                "claim dates must fall within the project window {}..{}",
                project.start_date, project.end_date
            ),
        }],
    })
}

/// Both validation passes, for callers that already hold the project.
pub fn validate_new_claim(draft: &NewClaim, project: &Project) -> Result<(), ValidationError> {
    validate_draft(draft)?;
    validate_against_project(draft, project)
}

/// The draft as it would look with the edits applied. Draft updates are
/// revalidated through this view so an edit cannot sneak a claim past the
/// constraints its creation was held to.
pub fn merged_draft(current: &Claim, fields: &ClaimUpdate) -> NewClaim {
    NewClaim {
        claim_name: fields.claim_name.clone().unwrap_or_else(|| current.claim_name.clone()),
        project_id: current.project_id.clone(),
        approval_id: current.approval_id.clone(),
        claim_start_date: fields.claim_start_date.unwrap_or(current.claim_start_date),
        claim_end_date: fields.claim_end_date.unwrap_or(current.claim_end_date),
        total_work_time: fields.total_work_time.unwrap_or(current.total_work_time),
        remark: fields.remark.clone().or_else(|| current.remark.clone()),
    }
}
