use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate};
use claimdesk_core::domain::project::ProjectId;
use claimdesk_core::domain::user::{RoleCode, UserId};
use claimdesk_core::errors::{ApplicationError, InterfaceError};
use claimdesk_core::paging::PageRequest;
use claimdesk_core::validation::NewClaim;
use claimdesk_core::workflow::rules::{Actor, ClaimAction};
use claimdesk_gateway::{
    ClaimFilter, ClaimLifecycle, ClaimsGateway, GatewayError, HttpGateway, LifecycleError,
    SearchScope,
};

use super::{CommandContext, CommandResult};

pub async fn create(
    name: String,
    project: String,
    approver: String,
    start: String,
    end: String,
    hours: String,
    remark: Option<String>,
) -> CommandResult {
    const COMMAND: &str = "claim.create";

    let claim_start_date = match parse_date(COMMAND, "start", &start) {
        Ok(date) => date,
        Err(result) => return result,
    };
    let claim_end_date = match parse_date(COMMAND, "end", &end) {
        Ok(date) => date,
        Err(result) => return result,
    };
    let total_work_time = match parse_hours(COMMAND, &hours) {
        Ok(value) => value,
        Err(result) => return result,
    };

    let draft = NewClaim {
        claim_name: name,
        project_id: ProjectId(project),
        approval_id: UserId(approver),
        claim_start_date,
        claim_end_date,
        total_work_time,
        remark,
    };

    let (lifecycle, _) = match lifecycle_for(COMMAND) {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    match lifecycle.create_claim(&draft).await {
        Ok(claim) => CommandResult::success(
            COMMAND,
            format!("created claim {} in status {}", claim.id, claim.status),
        ),
        Err(error) => lifecycle_failure(COMMAND, error),
    }
}

pub async fn submit(id: String) -> CommandResult {
    transition("claim.submit", id, None, ClaimAction::SendForApproval).await
}

pub async fn cancel(id: String, comment: Option<String>) -> CommandResult {
    transition("claim.cancel", id, comment, ClaimAction::Cancel).await
}

pub async fn approve(id: String, comment: Option<String>) -> CommandResult {
    transition("claim.approve", id, comment, ClaimAction::Approve).await
}

pub async fn reject(id: String, comment: Option<String>) -> CommandResult {
    transition("claim.reject", id, comment, ClaimAction::Reject).await
}

pub async fn pay(ids: Vec<String>) -> CommandResult {
    const COMMAND: &str = "claim.pay";

    let (lifecycle, _) = match lifecycle_for(COMMAND) {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    if let [single] = ids.as_slice() {
        let id = ClaimId(single.clone());
        return match lifecycle.mark_paid(&id).await {
            Ok(claim) => {
                CommandResult::success(COMMAND, format!("claim {} marked paid", claim.id))
            }
            Err(error) => lifecycle_failure(COMMAND, error),
        };
    }

    let ids: Vec<ClaimId> = ids.into_iter().map(ClaimId).collect();
    let outcome = lifecycle.mark_paid_batch(&ids).await;

    let mut lines =
        vec![format!("paid {} of {} claims", outcome.succeeded.len(), ids.len())];
    for id in &outcome.succeeded {
        lines.push(format!("  - paid: {id}"));
    }
    for failure in &outcome.failed {
        lines.push(format!("  - failed: {} ({})", failure.claim_id, failure.reason));
    }

    if outcome.is_complete_success() {
        CommandResult::success(COMMAND, lines.join("\n"))
    } else {
        CommandResult::failure(COMMAND, "batch_partial_failure", lines.join("\n"), 3)
    }
}

pub async fn update(
    id: String,
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    hours: Option<String>,
    remark: Option<String>,
) -> CommandResult {
    const COMMAND: &str = "claim.update";

    let claim_start_date = match start {
        Some(raw) => match parse_date(COMMAND, "start", &raw) {
            Ok(date) => Some(date),
            Err(result) => return result,
        },
        None => None,
    };
    let claim_end_date = match end {
        Some(raw) => match parse_date(COMMAND, "end", &raw) {
            Ok(date) => Some(date),
            Err(result) => return result,
        },
        None => None,
    };
    let total_work_time = match hours {
        Some(raw) => match parse_hours(COMMAND, &raw) {
            Ok(value) => Some(value),
            Err(result) => return result,
        },
        None => None,
    };

    let fields = ClaimUpdate {
        claim_name: name,
        claim_start_date,
        claim_end_date,
        total_work_time,
        remark,
    };
    if fields.is_empty() {
        return CommandResult::failure(COMMAND, "invalid_argument", "no fields to update", 2);
    }

    let (lifecycle, _) = match lifecycle_for(COMMAND) {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    match lifecycle.update_claim(&ClaimId(id), &fields).await {
        Ok(claim) => CommandResult::success(COMMAND, format!("claim {} updated", claim.id)),
        Err(error) => lifecycle_failure(COMMAND, error),
    }
}

pub async fn list(
    keyword: Option<String>,
    status: Option<String>,
    page: u32,
    page_size: u32,
) -> CommandResult {
    const COMMAND: &str = "claim.list";

    let status = match status {
        Some(raw) => match raw.parse::<ClaimStatus>() {
            Ok(status) => Some(status),
            Err(error) => return CommandResult::failure(COMMAND, "invalid_argument", error, 2),
        },
        None => None,
    };

    let (context, actor) = match context_and_actor(COMMAND) {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    let scope = scope_for(&actor);
    let filter = ClaimFilter { keyword, status };
    let request = PageRequest { page_num: page.max(1), page_size: page_size.max(1) };

    match context.gateway.search_claims(&scope, &filter, request).await {
        Ok(result) => {
            let mut lines = vec![format!(
                "page {}/{} ({} claims total)",
                request.page_num,
                result.page_info.total_pages.max(1),
                result.page_info.total_items
            )];
            for claim in &result.page_data {
                lines.push(render_row(claim));
            }
            CommandResult { exit_code: 0, output: lines.join("\n") }
        }
        Err(error) => gateway_failure(COMMAND, error),
    }
}

pub async fn show(id: String) -> CommandResult {
    const COMMAND: &str = "claim.show";

    let (context, _) = match context_and_actor(COMMAND) {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    match context.gateway.fetch_claim(&ClaimId(id)).await {
        Ok(claim) => CommandResult { exit_code: 0, output: render_detail(&claim) },
        Err(error) => gateway_failure(COMMAND, error),
    }
}

fn parse_date(command: &str, field: &str, raw: &str) -> Result<NaiveDate, CommandResult> {
    raw.parse::<NaiveDate>().map_err(|_| {
        CommandResult::failure(
            command,
            "invalid_argument",
            format!("`--{field}` must be a date in YYYY-MM-DD form, got `{raw}`"),
            2,
        )
    })
}

fn parse_hours(command: &str, raw: &str) -> Result<Decimal, CommandResult> {
    raw.parse::<Decimal>().map_err(|_| {
        CommandResult::failure(
            command,
            "invalid_argument",
            format!("`--hours` must be a decimal number, got `{raw}`"),
            2,
        )
    })
}

fn context_and_actor(command: &str) -> Result<(CommandContext, Actor), CommandResult> {
    let context = CommandContext::open().map_err(|(class, message)| {
        CommandResult::failure(command, &class, message, 2)
    })?;
    let actor = context.actor().map_err(|(class, message)| {
        CommandResult::failure(command, &class, message, 4)
    })?;
    Ok((context, actor))
}

fn lifecycle_for(command: &str) -> Result<(ClaimLifecycle<HttpGateway>, Actor), CommandResult> {
    let (context, actor) = context_and_actor(command)?;
    let lifecycle = ClaimLifecycle::new(Arc::new(context.gateway.clone()), actor.clone());
    Ok((lifecycle, actor))
}

async fn transition(
    command: &str,
    id: String,
    comment: Option<String>,
    action: ClaimAction,
) -> CommandResult {
    let (lifecycle, _) = match lifecycle_for(command) {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    let id = ClaimId(id);
    let result = match action {
        ClaimAction::SendForApproval => lifecycle.send_for_approval(&id).await,
        ClaimAction::Cancel => lifecycle.cancel(&id, comment).await,
        ClaimAction::Approve => lifecycle.approve(&id, comment).await,
        ClaimAction::Reject => lifecycle.reject(&id, comment).await,
        ClaimAction::MarkPaid => lifecycle.mark_paid(&id).await,
    };

    match result {
        Ok(claim) => CommandResult::success(
            command,
            format!("claim {} is now {}", claim.id, claim.status),
        ),
        Err(error) => lifecycle_failure(command, error),
    }
}

fn scope_for(actor: &Actor) -> SearchScope {
    match actor.role {
        RoleCode::Member => SearchScope::Claimer(actor.user_id.clone()),
        RoleCode::Approver => SearchScope::Approver(actor.user_id.clone()),
        RoleCode::Finance => SearchScope::Finance,
        RoleCode::Admin => SearchScope::Admin,
    }
}

fn lifecycle_failure(command: &str, error: LifecycleError) -> CommandResult {
    let error = match error {
        LifecycleError::Gateway(error) => return gateway_failure(command, error),
        other => other,
    };

    let detail = error.to_string();
    let interface = ApplicationError::from(error).into_interface(command);
    let (class, exit_code) = match &interface {
        InterfaceError::BadRequest { .. } => ("validation", 2),
        InterfaceError::Forbidden { .. } => ("forbidden", 3),
        InterfaceError::ServiceUnavailable { .. } => ("gateway", 5),
        InterfaceError::Internal { .. } => ("internal", 5),
    };
    CommandResult::failure(
        command,
        class,
        format!("{} ({detail})", interface.user_message()),
        exit_code,
    )
}

fn gateway_failure(command: &str, error: GatewayError) -> CommandResult {
    let (class, exit_code) = match &error {
        GatewayError::Unauthorized => ("unauthorized", 4),
        GatewayError::Forbidden(_) => ("forbidden", 3),
        GatewayError::NotFound(_) => ("not_found", 3),
        GatewayError::Conflict(_) => ("conflict", 3),
        GatewayError::Validation(_) => ("validation", 2),
        GatewayError::Network(_) => ("network", 5),
        GatewayError::Api(_) | GatewayError::InvalidResponse(_) => ("backend", 5),
    };
    CommandResult::failure(command, class, error.to_string(), exit_code)
}

fn render_row(claim: &Claim) -> String {
    format!(
        "- {} [{}] {} ({} .. {}, {}h) project={}",
        claim.id,
        claim.status,
        claim.claim_name,
        claim.claim_start_date,
        claim.claim_end_date,
        claim.total_work_time,
        claim.project_name.as_deref().unwrap_or(&claim.project_id.0),
    )
}

fn render_detail(claim: &Claim) -> String {
    let mut lines = vec![
        format!("claim {}", claim.id),
        format!("  status: {}", claim.status),
        format!("  name: {}", claim.claim_name),
        format!(
            "  project: {}",
            claim.project_name.as_deref().unwrap_or(&claim.project_id.0)
        ),
        format!("  staff: {}", claim.staff_name.as_deref().unwrap_or(&claim.staff_id.0)),
        format!(
            "  approver: {}",
            claim.approver_name.as_deref().unwrap_or(&claim.approval_id.0)
        ),
        format!("  range: {} .. {}", claim.claim_start_date, claim.claim_end_date),
        format!("  hours: {}", claim.total_work_time),
    ];
    if let Some(remark) = &claim.remark {
        lines.push(format!("  remark: {remark}"));
    }

    if claim.audit_trail.is_empty() {
        lines.push("  trail: (none)".to_string());
    } else {
        lines.push("  trail:".to_string());
        for entry in &claim.audit_trail {
            let comment = entry.comment.as_deref().unwrap_or("-");
            lines.push(format!(
                "    - {} -> {} by {} ({})",
                entry.recorded_at.format("%Y-%m-%d %H:%M"),
                entry.entered_status,
                entry.actor,
                comment
            ));
        }
    }

    lines.join("\n")
}
