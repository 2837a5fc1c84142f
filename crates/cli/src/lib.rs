pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "claimdesk",
    about = "Claimdesk operator CLI",
    long_about = "Drive claim lifecycles, browse and search claims, inspect statistics, \
and check configuration and backend readiness.",
    after_help = "Examples:\n  claimdesk claim create --name \"January overtime\" --project P-1 --approver u-pm --start 2025-01-10 --end 2025-01-12 --hours 8\n  claimdesk claim pay CLM-0001 CLM-0002\n  claimdesk doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Create, transition, list, and inspect claims")]
    Claim {
        #[command(subcommand)]
        action: ClaimCommand,
    },
    #[command(about = "Claim counts by status, department, or month")]
    Stats {
        #[command(subcommand)]
        kind: StatsCommand,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, session token readiness, and backend connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Store the backend bearer token and the signed-in identity")]
    Login {
        #[arg(long, help = "Bearer token issued by the backend")]
        token: String,
        #[arg(long, help = "Id of the signed-in user")]
        user_id: String,
        #[arg(long, help = "Display name of the signed-in user")]
        full_name: String,
        #[arg(long, help = "Account role: admin|finance|approver|member")]
        role: String,
    },
    #[command(about = "Drop the stored token and identity, keeping favorites")]
    Logout,
    #[command(about = "Manage the favorite-project list")]
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ClaimCommand {
    #[command(about = "Create a draft claim")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Project id the hours were worked on")]
        project: String,
        #[arg(long, help = "User id of the assigned approver")]
        approver: String,
        #[arg(long, help = "First day of the claimed range (YYYY-MM-DD)")]
        start: String,
        #[arg(long, help = "Last day of the claimed range (YYYY-MM-DD)")]
        end: String,
        #[arg(long, help = "Total claimed hours, minimum 1")]
        hours: String,
        #[arg(long)]
        remark: Option<String>,
    },
    #[command(about = "Send a draft claim for approval")]
    Submit { id: String },
    #[command(about = "Cancel a draft claim")]
    Cancel {
        id: String,
        #[arg(long)]
        comment: Option<String>,
    },
    #[command(about = "Approve a pending claim (assigned approver only)")]
    Approve {
        id: String,
        #[arg(long)]
        comment: Option<String>,
    },
    #[command(about = "Reject a pending claim (assigned approver only)")]
    Reject {
        id: String,
        #[arg(long)]
        comment: Option<String>,
    },
    #[command(about = "Mark approved claims as paid; multiple ids run as a best-effort batch")]
    Pay {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    #[command(about = "Edit fields of a draft claim you own")]
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        hours: Option<String>,
        #[arg(long)]
        remark: Option<String>,
    },
    #[command(about = "List claims visible to the signed-in role")]
    List {
        #[arg(long, help = "Keyword matched against claim, project, and staff names")]
        keyword: Option<String>,
        #[arg(long, help = "Filter by status, e.g. Draft or \"Pending Approval\"")]
        status: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    #[command(about = "Show one claim with its approval trail")]
    Show { id: String },
}

#[derive(Debug, Subcommand)]
enum StatsCommand {
    #[command(about = "Claim counts per status")]
    Status,
    #[command(about = "Claim counts per department of the claiming staff")]
    Department,
    #[command(about = "Claim counts per calendar month of the claim start date")]
    Month,
}

#[derive(Debug, Subcommand)]
enum FavoritesCommand {
    #[command(about = "List favorite project ids")]
    List,
    #[command(about = "Add a project to the favorites")]
    Add { project: String },
    #[command(about = "Remove a project from the favorites")]
    Remove { project: String },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Claim { action } => match action {
            ClaimCommand::Create { name, project, approver, start, end, hours, remark } => {
                commands::claims::create(name, project, approver, start, end, hours, remark).await
            }
            ClaimCommand::Submit { id } => commands::claims::submit(id).await,
            ClaimCommand::Cancel { id, comment } => commands::claims::cancel(id, comment).await,
            ClaimCommand::Approve { id, comment } => commands::claims::approve(id, comment).await,
            ClaimCommand::Reject { id, comment } => commands::claims::reject(id, comment).await,
            ClaimCommand::Pay { ids } => commands::claims::pay(ids).await,
            ClaimCommand::Update { id, name, start, end, hours, remark } => {
                commands::claims::update(id, name, start, end, hours, remark).await
            }
            ClaimCommand::List { keyword, status, page, page_size } => {
                commands::claims::list(keyword, status, page, page_size).await
            }
            ClaimCommand::Show { id } => commands::claims::show(id).await,
        },
        Command::Stats { kind } => match kind {
            StatsCommand::Status => commands::stats::by_status().await,
            StatsCommand::Department => commands::stats::by_department().await,
            StatsCommand::Month => commands::stats::by_month().await,
        },
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json).await }
        }
        Command::Login { token, user_id, full_name, role } => {
            commands::session::login(token, user_id, full_name, role)
        }
        Command::Logout => commands::session::logout(),
        Command::Favorites { action } => match action {
            FavoritesCommand::List => commands::session::favorites_list(),
            FavoritesCommand::Add { project } => commands::session::favorites_add(project),
            FavoritesCommand::Remove { project } => commands::session::favorites_remove(project),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
