use claimdesk_core::domain::project::ProjectId;
use claimdesk_core::domain::user::{RoleCode, UserId};
use claimdesk_core::session::UserSnapshot;

use super::{CommandContext, CommandResult};

pub fn login(token: String, user_id: String, full_name: String, role: String) -> CommandResult {
    const COMMAND: &str = "login";

    let role_code = match role.parse::<RoleCode>() {
        Ok(role_code) => role_code,
        Err(error) => return CommandResult::failure(COMMAND, "invalid_argument", error, 2),
    };
    if token.trim().is_empty() {
        return CommandResult::failure(COMMAND, "invalid_argument", "token must not be blank", 2);
    }

    let context = match CommandContext::open() {
        Ok(context) => context,
        Err((class, message)) => return CommandResult::failure(COMMAND, &class, message, 2),
    };

    let store = || -> Result<(), String> {
        context.session.set_token(token).map_err(|error| error.to_string())?;
        context
            .session
            .set_profile(UserSnapshot { user_id: UserId(user_id), full_name, role_code })
            .map_err(|error| error.to_string())
    };

    match store() {
        Ok(()) => CommandResult::success(COMMAND, format!("signed in as {role_code}")),
        Err(message) => CommandResult::failure(COMMAND, "session_store", message, 2),
    }
}

pub fn logout() -> CommandResult {
    const COMMAND: &str = "logout";

    let context = match CommandContext::open() {
        Ok(context) => context,
        Err((class, message)) => return CommandResult::failure(COMMAND, &class, message, 2),
    };

    match context.session.sign_out() {
        Ok(()) => CommandResult::success(COMMAND, "signed out; favorites kept"),
        Err(error) => CommandResult::failure(COMMAND, "session_store", error.to_string(), 2),
    }
}

pub fn favorites_list() -> CommandResult {
    const COMMAND: &str = "favorites.list";

    let context = match CommandContext::open() {
        Ok(context) => context,
        Err((class, message)) => return CommandResult::failure(COMMAND, &class, message, 2),
    };

    let favorites = context.session.favorites();
    if favorites.is_empty() {
        return CommandResult { exit_code: 0, output: "no favorite projects".to_string() };
    }

    let mut lines = vec![format!("{} favorite project(s):", favorites.len())];
    for project in favorites {
        lines.push(format!("- {project}"));
    }
    CommandResult { exit_code: 0, output: lines.join("\n") }
}

pub fn favorites_add(project: String) -> CommandResult {
    const COMMAND: &str = "favorites.add";

    let context = match CommandContext::open() {
        Ok(context) => context,
        Err((class, message)) => return CommandResult::failure(COMMAND, &class, message, 2),
    };

    match context.session.add_favorite(&ProjectId(project.clone())) {
        Ok(true) => CommandResult::success(COMMAND, format!("added {project} to favorites")),
        Ok(false) => CommandResult::success(COMMAND, format!("{project} was already a favorite")),
        Err(error) => CommandResult::failure(COMMAND, "session_store", error.to_string(), 2),
    }
}

pub fn favorites_remove(project: String) -> CommandResult {
    const COMMAND: &str = "favorites.remove";

    let context = match CommandContext::open() {
        Ok(context) => context,
        Err((class, message)) => return CommandResult::failure(COMMAND, &class, message, 2),
    };

    match context.session.remove_favorite(&ProjectId(project.clone())) {
        Ok(true) => CommandResult::success(COMMAND, format!("removed {project} from favorites")),
        Ok(false) => CommandResult::success(COMMAND, format!("{project} was not a favorite")),
        Err(error) => CommandResult::failure(COMMAND, "session_store", error.to_string(), 2),
    }
}
