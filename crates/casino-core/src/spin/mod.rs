//! Weekly spin records and veto usage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One of the two participants of a [`WeeklySpin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Column prefix used by the SQLite store.
    pub(crate) fn column_prefix(self) -> &'static str {
        match self {
            Side::A => "user_a",
            Side::B => "user_b",
        }
    }
}

/// A partner pair's assignments for one week.
///
/// A side that has not spun yet has no task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySpin {
    pub id: String,
    pub week_start_date: NaiveDate,
    pub user_a_id: String,
    pub user_b_id: String,
    pub user_a_task_id: Option<String>,
    pub user_b_task_id: Option<String>,
    pub user_a_completed: Option<bool>,
    pub user_b_completed: Option<bool>,
    pub user_a_verified_by_partner: Option<bool>,
    pub user_b_verified_by_partner: Option<bool>,
    pub user_a_vetoed: bool,
    pub user_b_vetoed: bool,
    pub created_at: DateTime<Utc>,
}

impl WeeklySpin {
    pub fn side_of(&self, user_id: &str) -> Option<Side> {
        if self.user_a_id == user_id {
            Some(Side::A)
        } else if self.user_b_id == user_id {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn user_id(&self, side: Side) -> &str {
        match side {
            Side::A => &self.user_a_id,
            Side::B => &self.user_b_id,
        }
    }

    pub fn task_id(&self, side: Side) -> Option<&str> {
        match side {
            Side::A => self.user_a_task_id.as_deref(),
            Side::B => self.user_b_task_id.as_deref(),
        }
    }

    pub fn completed(&self, side: Side) -> Option<bool> {
        match side {
            Side::A => self.user_a_completed,
            Side::B => self.user_b_completed,
        }
    }

    /// Whether `side`'s partner confirmed that `side` completed its task.
    pub fn verified_by_partner(&self, side: Side) -> Option<bool> {
        match side {
            Side::A => self.user_a_verified_by_partner,
            Side::B => self.user_b_verified_by_partner,
        }
    }

    pub fn vetoed(&self, side: Side) -> bool {
        match side {
            Side::A => self.user_a_vetoed,
            Side::B => self.user_b_vetoed,
        }
    }

    /// Both verification flags have been submitted, whatever their value.
    pub fn both_verified(&self) -> bool {
        [Side::A, Side::B]
            .into_iter()
            .all(|side| self.verified_by_partner(side).is_some())
    }

    pub fn status(&self) -> SpinStatus {
        let user_a_spun = self.user_a_task_id.is_some();
        let user_b_spun = self.user_b_task_id.is_some();
        SpinStatus {
            user_a_spun,
            user_b_spun,
            both_spun: user_a_spun && user_b_spun,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinStatus {
    pub user_a_spun: bool,
    pub user_b_spun: bool,
    pub both_spun: bool,
}

/// Record that `user_id` spent their monthly veto on a spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VetoUsage {
    pub id: String,
    pub user_id: String,
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub week_spin_id: String,
    pub used_date: NaiveDate,
}

/// A user's chosen task for a week, written into their own slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinClaim {
    pub week_start: NaiveDate,
    pub user_id: String,
    pub partner_id: String,
    pub task_id: String,
}

/// A veto to apply atomically: check the month, swap, flag, record usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetoRequest {
    pub spin_id: String,
    pub user_id: String,
    pub month: String,
    pub used_on: NaiveDate,
}
