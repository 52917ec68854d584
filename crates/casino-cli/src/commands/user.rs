//! Account commands.

use casino_core::storage::CasinoStore;
use casino_core::{user, CasinoDb, Config};
use clap::Subcommand;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account, linking to the partner if they already registered
    Register {
        /// Display name
        name: String,
        /// Email address (unique)
        email: String,
        /// Partner's email address
        #[arg(long)]
        partner_email: Option<String>,
    },
    /// Show the acting user and their partner
    Show,
    /// Make a registered user the active session
    Use {
        /// Email address
        email: String,
    },
}

pub fn run(ctx: &Context, action: UserAction) -> CliResult {
    let db = CasinoDb::open()?;

    match action {
        UserAction::Register {
            name,
            email,
            partner_email,
        } => {
            let registered = user::register(&db, &name, &email, partner_email.as_deref())?;
            let mut config = Config::load()?;
            if config.session_email().is_none() {
                config.session.user_email = registered.email.clone();
                config.save()?;
            }
            print_json(&registered)?;
        }
        UserAction::Show => {
            let config = Config::load()?;
            let session = ctx.session(&db, &config)?;
            print_json(&serde_json::json!({
                "user": session.user,
                "partner": session.partner,
            }))?;
        }
        UserAction::Use { email } => {
            let found = db
                .find_user_by_email(&email)?
                .ok_or_else(|| format!("no user registered with email {email}"))?;
            let mut config = Config::load()?;
            config.session.user_email = found.email.clone();
            config.save()?;
            println!("active user: {} <{}>", found.name, found.email);
        }
    }
    Ok(())
}
