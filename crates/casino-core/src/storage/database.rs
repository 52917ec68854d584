//! SQLite-backed [`CasinoStore`].
//!
//! Stores users, task pools, weekly spins and veto usage at
//! `<data_dir>/casino.db`. Timestamps are RFC 3339 text, week starts are
//! `YYYY-MM-DD`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{data_dir, migrations, CasinoStore};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::spin::{Side, SpinClaim, VetoRequest, VetoUsage, WeeklySpin};
use crate::task::{Task, TaskStatus};
use crate::user::{normalize_email, User};

const DATE_FORMAT: &str = "%Y-%m-%d";

const USER_COLUMNS: &str = "id, name, email, partner_id, created_at";
const TASK_COLUMNS: &str = "id, user_id, text, category, status, created_at, completed_at";
const SPIN_COLUMNS: &str = "id, week_start_date, user_a_id, user_b_id,
     user_a_task_id, user_b_task_id, user_a_completed, user_b_completed,
     user_a_verified_by_partner, user_b_verified_by_partner,
     user_a_vetoed, user_b_vetoed, created_at";
const VETO_COLUMNS: &str = "id, user_id, month, week_spin_id, used_date";

// === Helper Functions ===

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_optional_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn parse_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Order-independent key for a partner pair.
fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        partner_id: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
    })
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get(4)?;
    let status = TaskStatus::parse(&status_str).ok_or_else(|| {
        conversion_error(
            4,
            DatabaseError::CorruptValue {
                column: "tasks.status",
                value: status_str.clone(),
            },
        )
    })?;
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        text: row.get(2)?,
        category: row.get(3)?,
        status,
        created_at: parse_timestamp(row, 5)?,
        completed_at: parse_optional_timestamp(row, 6)?,
    })
}

fn row_to_spin(row: &Row) -> rusqlite::Result<WeeklySpin> {
    Ok(WeeklySpin {
        id: row.get(0)?,
        week_start_date: parse_date(row, 1)?,
        user_a_id: row.get(2)?,
        user_b_id: row.get(3)?,
        user_a_task_id: row.get(4)?,
        user_b_task_id: row.get(5)?,
        user_a_completed: row.get(6)?,
        user_b_completed: row.get(7)?,
        user_a_verified_by_partner: row.get(8)?,
        user_b_verified_by_partner: row.get(9)?,
        user_a_vetoed: row.get(10)?,
        user_b_vetoed: row.get(11)?,
        created_at: parse_timestamp(row, 12)?,
    })
}

fn row_to_veto(row: &Row) -> rusqlite::Result<VetoUsage> {
    Ok(VetoUsage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        month: row.get(2)?,
        week_spin_id: row.get(3)?,
        used_date: parse_date(row, 4)?,
    })
}

/// SQLite database for the couples casino.
pub struct CasinoDb {
    conn: Connection,
}

impl CasinoDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/casino.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("casino.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Run `f` inside an immediate transaction, rolling back on error.
    fn in_transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match f() {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    fn require_spin(&self, id: &str) -> Result<WeeklySpin> {
        self.get_spin(id)?
            .ok_or_else(|| CoreError::not_found("weekly spin", id))
    }

    fn set_spin_flag(&self, spin_id: &str, column: &str, value: bool) -> Result<WeeklySpin> {
        let changed = self.conn.execute(
            &format!("UPDATE weekly_spins SET {column} = ?1 WHERE id = ?2"),
            params![value, spin_id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("weekly spin", spin_id));
        }
        self.require_spin(spin_id)
    }
}

impl CasinoStore for CasinoDb {
    // === Users ===

    fn insert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, email, partner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.name,
                normalize_email(&user.email),
                user.partner_id,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![normalize_email(email)],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn link_partners(&self, user_id: &str, partner_id: &str) -> Result<()> {
        self.in_transaction(|| {
            for (id, partner) in [(user_id, partner_id), (partner_id, user_id)] {
                let changed = self.conn.execute(
                    "UPDATE users SET partner_id = ?1 WHERE id = ?2",
                    params![partner, id],
                )?;
                if changed == 0 {
                    return Err(CoreError::not_found("user", id));
                }
            }
            Ok(())
        })
    }

    // === Tasks ===

    fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, user_id, text, category, status, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id,
                task.user_id,
                task.text,
                task.category,
                task.status.as_str(),
                task.created_at.to_rfc3339(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET text = ?2, category = ?3, status = ?4, completed_at = ?5
             WHERE id = ?1",
            params![
                task.id,
                task.text,
                task.category,
                task.status.as_str(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("task", &task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<bool> {
        self.in_transaction(|| {
            let changed = self.conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND status != 'in_progress'",
                params![id],
            )?;
            if changed > 0 {
                return Ok(true);
            }
            match self.get_task(id)? {
                Some(_) => Err(CoreError::TaskAssigned {
                    task_id: id.to_string(),
                }),
                None => Ok(false),
            }
        })
    }

    fn list_tasks(&self, owner_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![owner_id, status.map(TaskStatus::as_str)], row_to_task)?;
        let tasks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id IN ({placeholders})"
        ))?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), row_to_task)?;
        let tasks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    // === Weekly spins ===

    fn find_spin(&self, user_id: &str, week_start: NaiveDate) -> Result<Option<WeeklySpin>> {
        let spin = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SPIN_COLUMNS} FROM weekly_spins
                     WHERE week_start_date = ?1 AND (user_a_id = ?2 OR user_b_id = ?2)
                     ORDER BY created_at DESC
                     LIMIT 1"
                ),
                params![format_date(week_start), user_id],
                row_to_spin,
            )
            .optional()?;
        Ok(spin)
    }

    fn get_spin(&self, id: &str) -> Result<Option<WeeklySpin>> {
        let spin = self
            .conn
            .query_row(
                &format!("SELECT {SPIN_COLUMNS} FROM weekly_spins WHERE id = ?1"),
                params![id],
                row_to_spin,
            )
            .optional()?;
        Ok(spin)
    }

    fn claim_spin(&self, claim: &SpinClaim) -> Result<WeeklySpin> {
        self.in_transaction(|| {
            let spin_id = match self.find_spin(&claim.user_id, claim.week_start)? {
                Some(spin) => {
                    let side = spin.side_of(&claim.user_id).ok_or_else(|| {
                        CoreError::NotParticipant {
                            user_id: claim.user_id.clone(),
                            spin_id: spin.id.clone(),
                        }
                    })?;
                    let column = format!("{}_task_id", side.column_prefix());
                    let changed = self.conn.execute(
                        &format!(
                            "UPDATE weekly_spins SET {column} = ?1 WHERE id = ?2 AND {column} IS NULL"
                        ),
                        params![claim.task_id, spin.id],
                    )?;
                    if changed == 0 {
                        return Err(CoreError::AlreadySpun {
                            week_start: claim.week_start,
                        });
                    }
                    spin.id
                }
                None => {
                    let id = Uuid::new_v4().to_string();
                    self.conn.execute(
                        "INSERT INTO weekly_spins (
                            id, week_start_date, user_a_id, user_b_id, pair_key,
                            user_a_task_id, created_at
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            id,
                            format_date(claim.week_start),
                            claim.user_id,
                            claim.partner_id,
                            pair_key(&claim.user_id, &claim.partner_id),
                            claim.task_id,
                            Utc::now().to_rfc3339(),
                        ],
                    )?;
                    id
                }
            };

            let moved = self.conn.execute(
                "UPDATE tasks SET status = 'in_progress', completed_at = NULL
                 WHERE id = ?1 AND status = 'available'",
                params![claim.task_id],
            )?;
            if moved == 0 {
                return Err(ValidationError::TaskNotEligible {
                    task_id: claim.task_id.clone(),
                    reason: "it is no longer available".into(),
                }
                .into());
            }

            self.require_spin(&spin_id)
        })
    }

    fn set_verification(&self, spin_id: &str, side: Side, verified: bool) -> Result<WeeklySpin> {
        let column = format!("{}_verified_by_partner", side.column_prefix());
        self.set_spin_flag(spin_id, &column, verified)
    }

    fn set_completion(&self, spin_id: &str, side: Side, completed: bool) -> Result<WeeklySpin> {
        let column = format!("{}_completed", side.column_prefix());
        self.set_spin_flag(spin_id, &column, completed)
    }

    // === Vetoes ===

    fn veto_usages(&self, user_id: &str, month: &str) -> Result<Vec<VetoUsage>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VETO_COLUMNS} FROM veto_usage
             WHERE user_id = ?1 AND month = ?2
             ORDER BY used_date"
        ))?;
        let rows = stmt.query_map(params![user_id, month], row_to_veto)?;
        let usages = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(usages)
    }

    fn apply_veto(&self, request: &VetoRequest) -> Result<WeeklySpin> {
        self.in_transaction(|| {
            if !self.veto_usages(&request.user_id, &request.month)?.is_empty() {
                return Err(CoreError::VetoUnavailable {
                    month: request.month.clone(),
                });
            }

            let spin = self.require_spin(&request.spin_id)?;
            let side = spin
                .side_of(&request.user_id)
                .ok_or_else(|| CoreError::NotParticipant {
                    user_id: request.user_id.clone(),
                    spin_id: spin.id.clone(),
                })?;
            if !spin.status().both_spun {
                return Err(CoreError::SpinIncomplete);
            }

            // Right-hand sides see the row as it was before the update.
            self.conn.execute(
                &format!(
                    "UPDATE weekly_spins
                     SET user_a_task_id = user_b_task_id,
                         user_b_task_id = user_a_task_id,
                         {}_vetoed = 1
                     WHERE id = ?1",
                    side.column_prefix()
                ),
                params![spin.id],
            )?;

            self.conn.execute(
                "INSERT INTO veto_usage (id, user_id, month, week_spin_id, used_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    request.user_id,
                    request.month,
                    spin.id,
                    format_date(request.used_on),
                ],
            )?;

            self.require_spin(&spin.id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn seed_pair(db: &CasinoDb) -> (User, User) {
        let alex = User::new("Alex", "alex@example.com").unwrap();
        let sam = User::new("Sam", "sam@example.com").unwrap();
        db.insert_user(&alex).unwrap();
        db.insert_user(&sam).unwrap();
        db.link_partners(&alex.id, &sam.id).unwrap();
        (alex, sam)
    }

    fn seed_task(db: &CasinoDb, owner: &User, text: &str) -> Task {
        let task = Task::new(&owner.id, text, None).unwrap();
        db.insert_task(&task).unwrap();
        task
    }

    fn claim(user: &User, partner: &User, task: &Task) -> SpinClaim {
        SpinClaim {
            week_start: week(),
            user_id: user.id.clone(),
            partner_id: partner.id.clone(),
            task_id: task.id.clone(),
        }
    }

    #[test]
    fn users_round_trip_and_link() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let found = db.find_user_by_email("ALEX@example.com").unwrap().unwrap();
        assert_eq!(found.id, alex.id);
        assert_eq!(found.partner_id.as_deref(), Some(sam.id.as_str()));
        assert!(db.get_user("missing").unwrap().is_none());
        assert!(db.link_partners(&alex.id, "missing").is_err());
    }

    #[test]
    fn task_crud() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, _) = seed_pair(&db);
        let mut task = seed_task(&db, &alex, "Picnic");

        task.text = "Sunset picnic".into();
        task.category = Some("Date Night".into());
        db.update_task(&task).unwrap();
        assert_eq!(db.get_task(&task.id).unwrap().unwrap(), task);

        assert!(db.delete_task(&task.id).unwrap());
        assert!(!db.delete_task(&task.id).unwrap());
        assert!(db.get_task(&task.id).unwrap().is_none());
        assert!(db.update_task(&task).is_err());
    }

    #[test]
    fn assigned_task_cannot_be_deleted() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let task = seed_task(&db, &sam, "for alex");
        db.claim_spin(&claim(&alex, &sam, &task)).unwrap();

        let err = db.delete_task(&task.id).unwrap_err();
        assert!(matches!(err, CoreError::TaskAssigned { ref task_id } if *task_id == task.id));
        assert_eq!(err.kind(), crate::error::ErrorKind::Precondition);
        assert_eq!(
            db.get_task(&task.id).unwrap().unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[test]
    fn list_tasks_filters_by_owner_and_status() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        seed_task(&db, &alex, "one");
        let mut done = seed_task(&db, &alex, "two");
        seed_task(&db, &sam, "three");
        done.mark_completed(Utc::now());
        db.update_task(&done).unwrap();

        assert_eq!(db.list_tasks(&alex.id, None).unwrap().len(), 2);
        let available = db.list_tasks(&alex.id, Some(TaskStatus::Available)).unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].text, "one");
        assert_eq!(db.list_tasks(&sam.id, None).unwrap().len(), 1);
    }

    #[test]
    fn tasks_by_ids_returns_only_matches() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, _) = seed_pair(&db);
        let a = seed_task(&db, &alex, "a");
        seed_task(&db, &alex, "b");
        let found = db
            .tasks_by_ids(&[a.id.clone(), "missing".to_string()])
            .unwrap();
        assert_eq!(found, vec![a]);
        assert!(db.tasks_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn first_claim_creates_record_and_second_fills_other_side() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let from_sam = seed_task(&db, &sam, "for alex");
        let from_alex = seed_task(&db, &alex, "for sam");

        let spin = db.claim_spin(&claim(&alex, &sam, &from_sam)).unwrap();
        assert_eq!(spin.user_a_id, alex.id);
        assert_eq!(spin.user_a_task_id.as_deref(), Some(from_sam.id.as_str()));
        assert_eq!(spin.user_b_task_id, None);
        assert_eq!(
            db.get_task(&from_sam.id).unwrap().unwrap().status,
            TaskStatus::InProgress
        );

        let spin = db.claim_spin(&claim(&sam, &alex, &from_alex)).unwrap();
        assert_eq!(spin.user_b_task_id.as_deref(), Some(from_alex.id.as_str()));
        assert!(spin.status().both_spun);
        assert_eq!(db.find_spin(&sam.id, week()).unwrap().unwrap().id, spin.id);
    }

    #[test]
    fn second_claim_by_same_user_is_rejected_and_rolled_back() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let first = seed_task(&db, &sam, "first");
        let second = seed_task(&db, &sam, "second");

        db.claim_spin(&claim(&alex, &sam, &first)).unwrap();
        let err = db.claim_spin(&claim(&alex, &sam, &second)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadySpun { .. }));
        assert_eq!(
            db.get_task(&second.id).unwrap().unwrap().status,
            TaskStatus::Available
        );
    }

    #[test]
    fn claiming_an_unavailable_task_rolls_back_the_record() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let mut task = seed_task(&db, &sam, "done already");
        task.mark_completed(Utc::now());
        db.update_task(&task).unwrap();

        assert!(db.claim_spin(&claim(&alex, &sam, &task)).is_err());
        assert!(db.find_spin(&alex.id, week()).unwrap().is_none());
    }

    #[test]
    fn verification_and_completion_flags() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let task = seed_task(&db, &sam, "t");
        let spin = db.claim_spin(&claim(&alex, &sam, &task)).unwrap();

        let spin = db.set_verification(&spin.id, Side::B, true).unwrap();
        assert_eq!(spin.user_b_verified_by_partner, Some(true));
        assert_eq!(spin.user_a_verified_by_partner, None);

        // re-submission overwrites
        let spin = db.set_verification(&spin.id, Side::B, false).unwrap();
        assert_eq!(spin.user_b_verified_by_partner, Some(false));

        let spin = db.set_completion(&spin.id, Side::A, true).unwrap();
        assert_eq!(spin.user_a_completed, Some(true));
        assert!(db.set_completion("missing", Side::A, true).is_err());
    }

    #[test]
    fn veto_swaps_once_per_month() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let for_alex = seed_task(&db, &sam, "for alex");
        let for_sam = seed_task(&db, &alex, "for sam");
        db.claim_spin(&claim(&alex, &sam, &for_alex)).unwrap();
        let spin = db.claim_spin(&claim(&sam, &alex, &for_sam)).unwrap();

        let request = VetoRequest {
            spin_id: spin.id.clone(),
            user_id: alex.id.clone(),
            month: "2026-10".into(),
            used_on: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        };
        let swapped = db.apply_veto(&request).unwrap();
        assert_eq!(swapped.user_a_task_id.as_deref(), Some(for_sam.id.as_str()));
        assert_eq!(swapped.user_b_task_id.as_deref(), Some(for_alex.id.as_str()));
        assert!(swapped.user_a_vetoed);
        assert!(!swapped.user_b_vetoed);
        assert_eq!(db.veto_usages(&alex.id, "2026-10").unwrap().len(), 1);

        let err = db.apply_veto(&request).unwrap_err();
        assert!(matches!(err, CoreError::VetoUnavailable { .. }));
        assert_eq!(db.get_spin(&spin.id).unwrap().unwrap(), swapped);
    }

    #[test]
    fn veto_needs_both_sides_assigned() {
        let db = CasinoDb::open_memory().unwrap();
        let (alex, sam) = seed_pair(&db);
        let task = seed_task(&db, &sam, "t");
        let spin = db.claim_spin(&claim(&alex, &sam, &task)).unwrap();
        let err = db
            .apply_veto(&VetoRequest {
                spin_id: spin.id,
                user_id: alex.id.clone(),
                month: "2026-10".into(),
                used_on: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::SpinIncomplete));
        assert!(db.veto_usages(&alex.id, "2026-10").unwrap().is_empty());
    }

    #[test]
    fn file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casino.db");
        let alex = User::new("Alex", "alex@example.com").unwrap();
        {
            let db = CasinoDb::open_at(&path).unwrap();
            db.insert_user(&alex).unwrap();
        }
        let db = CasinoDb::open_at(&path).unwrap();
        assert_eq!(db.get_user(&alex.id).unwrap().unwrap().name, "Alex");
    }
}
