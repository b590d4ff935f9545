//! Ledger schema definitions.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the ledger schema.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new ledger schema v{}", SCHEMA_VERSION);
        conn.execute_batch(LEDGER_SCHEMA)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating ledger schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

/// Get current schema version (0 if not initialized).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?)",
        [version],
    )?;
    Ok(())
}

fn migrate_schema(conn: &Connection, _from_version: i32) -> Result<()> {
    // Migration steps go here as the schema evolves
    set_schema_version(conn, SCHEMA_VERSION)
}

const LEDGER_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS receipts (
    id            TEXT PRIMARY KEY,
    value         INTEGER NOT NULL CHECK (value >= 0),
    recipient_id  TEXT NOT NULL,
    sender_id     TEXT,
    event_id      TEXT NOT NULL,
    season        TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    claimed_at    TEXT
);

CREATE INDEX IF NOT EXISTS idx_receipts_recipient
    ON receipts(recipient_id, claimed_at);

CREATE TABLE IF NOT EXISTS balances (
    user_id  TEXT PRIMARY KEY,
    balance  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS commitments (
    week             TEXT PRIMARY KEY,
    season           TEXT NOT NULL,
    merkle_tree_root TEXT NOT NULL,
    total_claimable  INTEGER NOT NULL,
    claims_json      TEXT NOT NULL,
    created_at       TEXT NOT NULL
);
";
