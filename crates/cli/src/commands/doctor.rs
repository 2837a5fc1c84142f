use claimdesk_core::config::{AppConfig, LoadOptions};
use claimdesk_core::session::SessionStore;
use claimdesk_gateway::HttpGateway;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub async fn run(json_output: bool) -> String {
    let report = build_report().await;

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

async fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_session_token(&config));
            checks.push(check_backend_connectivity(&config).await);
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "session_token_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "backend_connectivity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_session_token(config: &AppConfig) -> DoctorCheck {
    match SessionStore::open(&config.session.store_path) {
        Ok(session) => {
            if session.has_token() || config.api.token.is_some() {
                DoctorCheck {
                    name: "session_token_readiness",
                    status: CheckStatus::Pass,
                    details: "a bearer token is available for backend calls".to_string(),
                }
            } else {
                DoctorCheck {
                    name: "session_token_readiness",
                    status: CheckStatus::Fail,
                    details: "no bearer token stored; run `claimdesk login` or set api.token"
                        .to_string(),
                }
            }
        }
        Err(error) => DoctorCheck {
            name: "session_token_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

async fn check_backend_connectivity(config: &AppConfig) -> DoctorCheck {
    let gateway = match HttpGateway::from_config(&config.api) {
        Ok(gateway) => gateway,
        Err(error) => {
            return DoctorCheck {
                name: "backend_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize HTTP client: {error}"),
            };
        }
    };

    match gateway.ping().await {
        Ok(()) => DoctorCheck {
            name: "backend_connectivity",
            status: CheckStatus::Pass,
            details: format!("reached `{}`", config.api.base_url),
        },
        Err(error) => DoctorCheck {
            name: "backend_connectivity",
            status: CheckStatus::Fail,
            details: format!("failed to reach `{}`: {error}", config.api.base_url),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
