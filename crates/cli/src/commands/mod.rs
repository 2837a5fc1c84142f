pub mod claims;
pub mod config;
pub mod doctor;
pub mod session;
pub mod stats;

use serde::Serialize;

use claimdesk_core::config::{AppConfig, LoadOptions};
use claimdesk_core::session::SessionStore;
use claimdesk_core::workflow::rules::Actor;
use claimdesk_gateway::HttpGateway;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Everything a backend-touching command needs: the local session store and
/// a gateway built from validated config, carrying the session token when
/// one exists.
pub(crate) struct CommandContext {
    pub session: SessionStore,
    pub gateway: HttpGateway,
}

impl CommandContext {
    pub fn open() -> Result<Self, (String, String)> {
        let config = AppConfig::load(LoadOptions::default())
            .map_err(|error| ("config_validation".to_string(), error.to_string()))?;

        let session = SessionStore::open(&config.session.store_path)
            .map_err(|error| ("session_store".to_string(), error.to_string()))?;

        let mut gateway = HttpGateway::from_config(&config.api)
            .map_err(|error| ("gateway_setup".to_string(), error.to_string()))?;
        if let Some(token) = session.token() {
            gateway.set_token(token);
        }

        Ok(Self { session, gateway })
    }

    /// The workflow actor for the signed-in user. Commands that transition
    /// claims refuse to run without a cached identity.
    pub fn actor(&self) -> Result<Actor, (String, String)> {
        self.session.actor().ok_or_else(|| {
            (
                "not_signed_in".to_string(),
                "no signed-in identity; run `claimdesk login` first".to_string(),
            )
        })
    }
}
