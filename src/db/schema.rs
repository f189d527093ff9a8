// ABOUTME: Table definitions for both client layouts
// ABOUTME: Creates tables idempotently and records which layout a database was created with

use rusqlite::{params, Connection};

use super::store::StoreError;
use crate::models::SchemaVariant;

const METADATA_DDL: &str = r#"
    -- Key/value bookkeeping
    CREATE TABLE IF NOT EXISTS _metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

const NORMALIZED_DDL: &str = r#"
    -- Clients
    CREATE TABLE IF NOT EXISTS client (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(30) NOT NULL,
        surname VARCHAR(30) NOT NULL,
        email VARCHAR(60) NOT NULL
    );

    -- Phone numbers, any number per client
    CREATE TABLE IF NOT EXISTS phone (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL REFERENCES client(id),
        number VARCHAR(100)
    );

    CREATE INDEX IF NOT EXISTS idx_phone_client ON phone(client_id);
"#;

const DENORMALIZED_DDL: &str = r#"
    -- Clients with at most one phone number
    CREATE TABLE IF NOT EXISTS client (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(30) NOT NULL,
        surname VARCHAR(30) NOT NULL,
        email VARCHAR(60) NOT NULL,
        phone VARCHAR(100)
    );
"#;

/// Bookkeeping written by `create_tables`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaInfo {
    pub variant: SchemaVariant,
    #[serde(rename = "lastVersionSeen")]
    pub last_version_seen: String,
}

/// Create the tables for `variant` if absent.
///
/// Fails with `VariantMismatch` when the database was initialized with the other layout;
/// in that case no client tables are touched.
pub fn create_tables(conn: &Connection, variant: SchemaVariant) -> Result<(), StoreError> {
    conn.execute_batch(METADATA_DDL)?;

    if let Some(stored) = stored_variant(conn)? {
        if stored != variant {
            return Err(StoreError::VariantMismatch {
                stored,
                requested: variant,
            });
        }
    }

    let ddl = match variant {
        SchemaVariant::Normalized => NORMALIZED_DDL,
        SchemaVariant::Denormalized => DENORMALIZED_DDL,
    };
    conn.execute_batch(ddl)?;

    conn.execute(
        "INSERT OR IGNORE INTO _metadata (key, value) VALUES ('schema_variant', ?)",
        params![variant.as_str()],
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO _metadata (key, value) VALUES ('last_version_seen', ?)",
        params![env!("CARGO_PKG_VERSION")],
    )?;

    log::debug!("tables ready for {} layout", variant.as_str());
    Ok(())
}

/// Layout recorded in `_metadata`, if any
pub fn stored_variant(conn: &Connection) -> Result<Option<SchemaVariant>, StoreError> {
    match read_key(conn, "schema_variant")? {
        Some(value) => SchemaVariant::parse(&value)
            .map(Some)
            .ok_or(StoreError::UnknownVariant(value)),
        None => Ok(None),
    }
}

/// Read back what `create_tables` recorded
pub fn schema_info(conn: &Connection) -> Result<SchemaInfo, StoreError> {
    let variant = stored_variant(conn)?.ok_or(StoreError::NotInitialized)?;
    let last_version_seen =
        read_key(conn, "last_version_seen")?.unwrap_or_else(|| "0.0.0".to_string());
    Ok(SchemaInfo {
        variant,
        last_version_seen,
    })
}

fn read_key(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    match conn.query_row(
        "SELECT value FROM _metadata WHERE key = ?",
        params![key],
        |row| row.get::<_, String>(0),
    ) {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
