use claimdesk_core::domain::claim::Claim;
use claimdesk_core::domain::lookup::LookupKind;
use claimdesk_core::domain::user::RoleCode;
use claimdesk_core::paging::PageRequest;
use claimdesk_core::stats::{count_by_department, count_by_month, count_by_status, DepartmentIndex};
use claimdesk_core::workflow::rules::Actor;
use claimdesk_gateway::{ClaimFilter, ClaimsGateway, SearchScope};

use super::{CommandContext, CommandResult};

/// Statistics recompute over the claims visible to the signed-in role; this
/// is the bounded-collection assumption the dashboards rely on.
const STATS_FETCH_SIZE: u32 = 500;

pub async fn by_status() -> CommandResult {
    const COMMAND: &str = "stats.status";

    let (_, claims) = match fetch_claims(COMMAND).await {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    let counts = count_by_status(&claims);
    let mut lines = vec![format!("claim counts by status ({} claims):", claims.len())];
    for (status, count) in counts {
        lines.push(format!("- {status}: {count}"));
    }
    CommandResult { exit_code: 0, output: lines.join("\n") }
}

pub async fn by_department() -> CommandResult {
    const COMMAND: &str = "stats.department";

    let (context, claims) = match fetch_claims(COMMAND).await {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    let departments = match context.gateway.fetch_lookup(LookupKind::Departments).await {
        Ok(items) => items,
        Err(error) => {
            return CommandResult::failure(COMMAND, "gateway", error.to_string(), 5);
        }
    };
    let users = match context
        .gateway
        .search_users(None, PageRequest { page_num: 1, page_size: STATS_FETCH_SIZE })
        .await
    {
        Ok(page) => page.page_data,
        Err(error) => {
            return CommandResult::failure(COMMAND, "gateway", error.to_string(), 5);
        }
    };

    let index = DepartmentIndex::new(&departments, &users);
    let counts = count_by_department(&claims, &index);

    let mut lines = vec![format!("claim counts by department ({} claims):", claims.len())];
    for (department, count) in counts {
        lines.push(format!("- {department}: {count}"));
    }
    CommandResult { exit_code: 0, output: lines.join("\n") }
}

pub async fn by_month() -> CommandResult {
    const COMMAND: &str = "stats.month";

    let (_, claims) = match fetch_claims(COMMAND).await {
        Ok(parts) => parts,
        Err(result) => return result,
    };

    let counts = count_by_month(&claims);
    let mut lines = vec![format!("claim counts by month ({} claims):", claims.len())];
    for (month, count) in counts {
        lines.push(format!("- {month}: {count}"));
    }
    CommandResult { exit_code: 0, output: lines.join("\n") }
}

async fn fetch_claims(command: &str) -> Result<(CommandContext, Vec<Claim>), CommandResult> {
    let context = CommandContext::open()
        .map_err(|(class, message)| CommandResult::failure(command, &class, message, 2))?;
    let actor = context
        .actor()
        .map_err(|(class, message)| CommandResult::failure(command, &class, message, 4))?;

    let scope = scope_for(&actor);
    let page = context
        .gateway
        .search_claims(
            &scope,
            &ClaimFilter::default(),
            PageRequest { page_num: 1, page_size: STATS_FETCH_SIZE },
        )
        .await
        .map_err(|error| CommandResult::failure(command, "gateway", error.to_string(), 5))?;

    Ok((context, page.page_data))
}

fn scope_for(actor: &Actor) -> SearchScope {
    match actor.role {
        RoleCode::Member => SearchScope::Claimer(actor.user_id.clone()),
        RoleCode::Approver => SearchScope::Approver(actor.user_id.clone()),
        RoleCode::Finance => SearchScope::Finance,
        RoleCode::Admin => SearchScope::Admin,
    }
}
