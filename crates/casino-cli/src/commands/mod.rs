pub mod config;
pub mod task;
pub mod user;
pub mod week;

use casino_core::{CasinoDb, Config, Session};
use chrono::{DateTime, Local};

pub type BoxError = Box<dyn std::error::Error>;
pub type CliResult = Result<(), BoxError>;

/// Global flags shared by every command.
pub struct Context {
    as_user: Option<String>,
    at: Option<DateTime<Local>>,
}

impl Context {
    pub fn new(as_user: Option<String>, at: Option<&str>) -> Result<Self, BoxError> {
        let at = at
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|e| format!("invalid --at '{raw}': {e}"))
            })
            .transpose()?;
        Ok(Self { as_user, at })
    }

    /// The clock, or the instant given with `--at`.
    pub fn now(&self) -> DateTime<Local> {
        self.at.unwrap_or_else(Local::now)
    }

    pub fn fixed_time(&self) -> Option<DateTime<Local>> {
        self.at
    }

    /// Email of the acting user: `--as`, then the configured session.
    pub fn email(&self, config: &Config) -> Result<String, BoxError> {
        match self.as_user.as_deref().or_else(|| config.session_email()) {
            Some(email) => Ok(email.to_string()),
            None => {
                Err("no active user; pass --as <email> or run `casino user use <email>`".into())
            }
        }
    }

    pub fn session(&self, db: &CasinoDb, config: &Config) -> Result<Session, BoxError> {
        let email = self.email(config)?;
        Ok(Session::load(db, &email)?)
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
