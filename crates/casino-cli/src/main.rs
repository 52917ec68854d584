use casino_core::{CoreError, ErrorKind};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "casino", version, about = "Couples Casino CLI")]
struct Cli {
    /// Act as this user instead of the active session
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    as_user: Option<String>,
    /// Use this instant as "now" (RFC 3339)
    #[arg(long, global = true, value_name = "RFC3339")]
    at: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account and partner management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Task pool management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Weekly spin, verification and veto
    Week {
        #[command(subcommand)]
        action: commands::week::WeekAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CASINO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Follow-up advice for an error family. Precondition failures explain
/// themselves.
fn hint(err: &(dyn std::error::Error + 'static)) -> Option<&'static str> {
    match err.downcast_ref::<CoreError>()?.kind() {
        ErrorKind::InsufficientData => Some("ask your partner to add more tasks, then spin again"),
        ErrorKind::Persistence => Some("the data store could not complete the request; try again"),
        ErrorKind::Precondition => None,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = commands::Context::new(cli.as_user, cli.at.as_deref()).and_then(|ctx| {
        match cli.command {
            Commands::User { action } => commands::user::run(&ctx, action),
            Commands::Task { action } => commands::task::run(&ctx, action),
            Commands::Week { action } => commands::week::run(&ctx, action),
            Commands::Config { action } => commands::config::run(action),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        if let Some(hint) = hint(e.as_ref()) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}
