//! Users and the per-call session snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result, ValidationError};
use crate::storage::CasinoStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub partner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "name" }.into());
        }
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(ValidationError::InvalidValue {
                field: "email".into(),
                message: format!("'{email}' is not an email address"),
            }
            .into());
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            partner_id: None,
            created_at: Utc::now(),
        })
    }
}

/// Emails are matched case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Immutable snapshot of who is acting and who their partner is.
///
/// Built once per command and handed to every workflow call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub partner: Option<User>,
}

impl Session {
    pub fn new(user: User, partner: Option<User>) -> Self {
        Self { user, partner }
    }

    /// Load the user by email together with their linked partner.
    pub fn load<S: CasinoStore + ?Sized>(store: &S, email: &str) -> Result<Self> {
        let user = store
            .find_user_by_email(email)?
            .ok_or_else(|| CoreError::not_found("user", email))?;
        let partner = match user.partner_id.as_deref() {
            Some(id) => store.get_user(id)?,
            None => None,
        };
        Ok(Self { user, partner })
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn partner(&self) -> Result<&User> {
        self.partner.as_ref().ok_or(CoreError::PartnerNotLinked)
    }
}

/// Register a user and link them to `partner_email` when that account exists.
///
/// Linking is mutual; an unknown partner email is not an error, the partner
/// links up when they register with this user's email. A partner who is
/// already linked to someone else is left alone.
pub fn register<S: CasinoStore + ?Sized>(
    store: &S,
    name: &str,
    email: &str,
    partner_email: Option<&str>,
) -> Result<User> {
    let mut user = User::new(name, email)?;
    if store.find_user_by_email(&user.email)?.is_some() {
        return Err(ValidationError::InvalidValue {
            field: "email".into(),
            message: format!("'{}' is already registered", user.email),
        }
        .into());
    }
    store.insert_user(&user)?;
    tracing::info!(user_id = %user.id, "user registered");

    if let Some(partner_email) = partner_email {
        if let Some(partner) = store.find_user_by_email(partner_email)? {
            if partner.partner_id.is_some() {
                tracing::warn!(
                    user_id = %user.id,
                    partner_id = %partner.id,
                    "partner already linked"
                );
            } else if partner.id != user.id {
                store.link_partners(&user.id, &partner.id)?;
                user.partner_id = Some(partner.id.clone());
                tracing::info!(user_id = %user.id, partner_id = %partner.id, "partners linked");
            }
        }
    }
    Ok(user)
}
