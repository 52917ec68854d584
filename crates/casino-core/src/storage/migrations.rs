//! Database schema migrations for couples-casino.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: users, tasks, weekly spins and veto usage.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            partner_id  TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            text          TEXT NOT NULL,
            category      TEXT,
            status        TEXT NOT NULL DEFAULT 'available',
            created_at    TEXT NOT NULL,
            completed_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS weekly_spins (
            id                          TEXT PRIMARY KEY,
            week_start_date             TEXT NOT NULL,
            user_a_id                   TEXT NOT NULL,
            user_b_id                   TEXT NOT NULL,
            pair_key                    TEXT NOT NULL,
            user_a_task_id              TEXT,
            user_b_task_id              TEXT,
            user_a_completed            INTEGER,
            user_b_completed            INTEGER,
            user_a_verified_by_partner  INTEGER,
            user_b_verified_by_partner  INTEGER,
            user_a_vetoed               INTEGER NOT NULL DEFAULT 0,
            user_b_vetoed               INTEGER NOT NULL DEFAULT 0,
            created_at                  TEXT NOT NULL,
            UNIQUE (week_start_date, pair_key)
        );

        CREATE TABLE IF NOT EXISTS veto_usage (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            month         TEXT NOT NULL,
            week_spin_id  TEXT NOT NULL,
            used_date     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_user_status ON tasks(user_id, status);
        CREATE INDEX IF NOT EXISTS idx_weekly_spins_week ON weekly_spins(week_start_date);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: one veto per user per month, enforced by the schema.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_veto_usage_user_month
             ON veto_usage(user_id, month);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn veto_usage_rejects_second_row_for_same_month() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let insert = "INSERT INTO veto_usage (id, user_id, month, week_spin_id, used_date)
                      VALUES (?1, 'u1', '2026-10', 's1', '2026-10-19')";
        conn.execute(insert, ["v1"]).unwrap();
        assert!(conn.execute(insert, ["v2"]).is_err());
    }
}
