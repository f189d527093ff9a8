// ABOUTME: SQLite-backed client store for Client Book
// ABOUTME: Owns the connection and implements every create, update, delete and lookup operation

use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::filter::{self, ClientField};
use super::schema::{self, SchemaInfo};
use crate::models::{
    Client, ClientFilter, ClientPatch, ClientRecord, NewClient, Phone, PhoneAdded, PhoneRemoved,
    Removed, SchemaVariant, Updated,
};

pub const IN_MEMORY: &str = ":memory:";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("At least one filter field is required")]
    EmptyFilter,
    #[error(
        "Database uses the {} layout, but {} was requested",
        .stored.as_str(),
        .requested.as_str()
    )]
    VariantMismatch {
        stored: SchemaVariant,
        requested: SchemaVariant,
    },
    #[error("Unknown schema variant recorded in database: {0}")]
    UnknownVariant(String),
    #[error("Database not initialized")]
    NotInitialized,
    #[error("Data directory not found")]
    NoDirFound,
}

impl StoreError {
    /// Errors caused by the request itself rather than by the database
    pub fn is_rejection(&self) -> bool {
        matches!(self, StoreError::Validation { .. } | StoreError::EmptyFilter)
    }
}

pub struct ClientStore {
    conn: Connection,
    variant: SchemaVariant,
}

fn row_to_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        email: row.get(3)?,
    })
}

impl ClientStore {
    /// Default database file under the local data directory
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_local_dir().ok_or(StoreError::NoDirFound)?;
        Ok(data_dir.join("client-book").join("clients.db"))
    }

    /// Open or create the database at `path` (`:memory:` for a throwaway one)
    pub fn open(path: &str, variant: SchemaVariant) -> Result<Self, StoreError> {
        if path == IN_MEMORY {
            return Self::open_in_memory(variant);
        }

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        log::info!("opening client database at {} ({} layout)", path, variant.as_str());
        Self::with_connection(Connection::open(path)?, variant)
    }

    pub fn open_in_memory(variant: SchemaVariant) -> Result<Self, StoreError> {
        log::info!("opening in-memory client database ({} layout)", variant.as_str());
        Self::with_connection(Connection::open_in_memory()?, variant)
    }

    /// Wrap an existing connection and make sure the tables exist
    pub fn with_connection(conn: Connection, variant: SchemaVariant) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = Self { conn, variant };
        store.initialize()?;
        Ok(store)
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// Create the tables if absent; safe to call repeatedly
    pub fn initialize(&self) -> Result<(), StoreError> {
        schema::create_tables(&self.conn, self.variant)
    }

    pub fn schema_info(&self) -> Result<SchemaInfo, StoreError> {
        schema::schema_info(&self.conn)
    }

    // ===== Reads =====

    pub fn client_exists(&self, id: i64) -> Result<bool, StoreError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM client WHERE id = ?)",
            params![id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    /// Phone numbers of a client, oldest first
    pub fn phones_for(&self, client_id: i64) -> Result<Vec<String>, StoreError> {
        let sql = match self.variant {
            SchemaVariant::Normalized => {
                "SELECT number FROM phone WHERE client_id = ? ORDER BY id"
            }
            SchemaVariant::Denormalized => "SELECT phone FROM client WHERE id = ?",
        };
        let mut stmt = self.conn.prepare(sql)?;
        let numbers = stmt
            .query_map(params![client_id], |row| row.get::<_, Option<String>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(numbers.into_iter().flatten().collect())
    }

    pub fn get_client(&self, id: i64) -> Result<Option<ClientRecord>, StoreError> {
        let client = match self.conn.query_row(
            "SELECT id, name, surname, email FROM client WHERE id = ?",
            params![id],
            row_to_client,
        ) {
            Ok(client) => client,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(self.with_phones(client)?))
    }

    /// Every client, ordered by id
    pub fn list_clients(&self) -> Result<Vec<ClientRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, surname, email FROM client ORDER BY id")?;
        let clients = stmt
            .query_map([], row_to_client)?
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_phones(clients)
    }

    /// Clients matching every supplied filter field, ordered by id
    pub fn find_clients(&self, filter: &ClientFilter) -> Result<Vec<ClientRecord>, StoreError> {
        let clause = filter::where_clause(filter, self.variant)?;
        let sql = format!(
            "SELECT id, name, surname, email FROM client WHERE {} ORDER BY id",
            clause.sql
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let clients = stmt
            .query_map(params_from_iter(clause.values.iter()), row_to_client)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("lookup matched {} client(s)", clients.len());
        self.attach_phones(clients)
    }

    fn with_phones(&self, client: Client) -> Result<ClientRecord, StoreError> {
        let phones = self.phones_for(client.id)?;
        Ok(ClientRecord { client, phones })
    }

    fn attach_phones(&self, clients: Vec<Client>) -> Result<Vec<ClientRecord>, StoreError> {
        clients
            .into_iter()
            .map(|client| self.with_phones(client))
            .collect()
    }

    // ===== Writes =====

    /// Insert a client, and its phone if one is given, in a single transaction
    pub fn add_client(&mut self, new: &NewClient) -> Result<Client, StoreError> {
        ClientField::Name.validate(&new.name)?;
        ClientField::Surname.validate(&new.surname)?;
        ClientField::Email.validate(&new.email)?;
        if let Some(phone) = &new.phone {
            ClientField::Phone.validate(phone)?;
        }

        let variant = self.variant;
        let tx = self.conn.transaction()?;
        let id = match variant {
            SchemaVariant::Normalized => {
                tx.execute(
                    "INSERT INTO client (name, surname, email) VALUES (?, ?, ?)",
                    params![new.name, new.surname, new.email],
                )?;
                let client_id = tx.last_insert_rowid();
                if let Some(phone) = &new.phone {
                    tx.execute(
                        "INSERT INTO phone (client_id, number) VALUES (?, ?)",
                        params![client_id, phone],
                    )?;
                }
                client_id
            }
            SchemaVariant::Denormalized => {
                tx.execute(
                    "INSERT INTO client (name, surname, email, phone) VALUES (?, ?, ?, ?)",
                    params![new.name, new.surname, new.email, new.phone],
                )?;
                tx.last_insert_rowid()
            }
        };
        tx.commit()?;

        log::info!("client {} {} added with id {}", new.name, new.surname, id);
        Ok(Client {
            id,
            name: new.name.clone(),
            surname: new.surname.clone(),
            email: new.email.clone(),
        })
    }

    /// Attach a phone number to an existing client
    pub fn add_phone(&mut self, client_id: i64, number: &str) -> Result<PhoneAdded, StoreError> {
        ClientField::Phone.validate(number)?;
        if !self.client_exists(client_id)? {
            log::warn!("cannot add phone: client {} not found", client_id);
            return Ok(PhoneAdded::ClientNotFound);
        }

        match self.variant {
            SchemaVariant::Normalized => {
                self.conn.execute(
                    "INSERT INTO phone (client_id, number) VALUES (?, ?)",
                    params![client_id, number],
                )?;
                let phone = Phone {
                    id: self.conn.last_insert_rowid(),
                    client_id,
                    number: number.to_string(),
                };
                log::info!("phone {} added to client {}", number, client_id);
                Ok(PhoneAdded::Added { phone })
            }
            SchemaVariant::Denormalized => {
                if let Some(existing) = self.phones_for(client_id)?.into_iter().next() {
                    log::warn!("client {} already has phone {}", client_id, existing);
                    return Ok(PhoneAdded::SlotOccupied { existing });
                }
                self.conn.execute(
                    "UPDATE client SET phone = ? WHERE id = ?",
                    params![number, client_id],
                )?;
                log::info!("phone {} added to client {}", number, client_id);
                // The phone shares its client's row, so it carries the client id
                Ok(PhoneAdded::Added {
                    phone: Phone {
                        id: client_id,
                        client_id,
                        number: number.to_string(),
                    },
                })
            }
        }
    }

    /// Apply the supplied fields of `patch` to a client
    pub fn update_client(&mut self, id: i64, patch: &ClientPatch) -> Result<Updated, StoreError> {
        if !self.client_exists(id)? {
            log::warn!("cannot update: client {} not found", id);
            return Ok(Updated::ClientNotFound);
        }
        if patch.is_empty() {
            log::warn!("update of client {} has no fields, nothing changed", id);
            return Ok(Updated::NoChanges);
        }
        for (field, value) in filter::patch_fields(patch) {
            field.validate(value)?;
        }

        let variant = self.variant;
        let tx = self.conn.transaction()?;
        if let Some(set) = filter::set_clause(patch, variant) {
            let sql = format!("UPDATE client SET {} WHERE id = ?", set.sql);
            let mut values: Vec<rusqlite::types::Value> =
                set.values.into_iter().map(Into::into).collect();
            values.push(id.into());
            tx.execute(&sql, params_from_iter(values))?;
        }
        if let (SchemaVariant::Normalized, Some(number)) = (variant, &patch.phone) {
            let changed = tx.execute(
                "UPDATE phone SET number = ? WHERE client_id = ?",
                params![number, id],
            )?;
            if changed == 0 {
                tx.execute(
                    "INSERT INTO phone (client_id, number) VALUES (?, ?)",
                    params![id, number],
                )?;
            }
        }
        tx.commit()?;

        log::info!("client {} updated", id);
        match self.get_client(id)? {
            Some(record) => Ok(Updated::Applied { record }),
            None => Ok(Updated::ClientNotFound),
        }
    }

    /// Delete a client; in the normalized layout its phones go in the same transaction
    pub fn delete_client(&mut self, id: i64) -> Result<Removed, StoreError> {
        if !self.client_exists(id)? {
            log::warn!("cannot delete: client {} not found", id);
            return Ok(Removed::NotFound);
        }

        let variant = self.variant;
        let phones = self.phones_for(id)?.len();
        let tx = self.conn.transaction()?;
        if variant == SchemaVariant::Normalized {
            tx.execute("DELETE FROM phone WHERE client_id = ?", params![id])?;
        }
        tx.execute("DELETE FROM client WHERE id = ?", params![id])?;
        tx.commit()?;

        log::info!("client {} deleted with {} phone(s)", id, phones);
        Ok(Removed::Removed { phones })
    }

    /// Remove a specific phone number from a client
    pub fn delete_phone(
        &mut self,
        client_id: i64,
        number: &str,
    ) -> Result<PhoneRemoved, StoreError> {
        if !self.client_exists(client_id)? {
            log::warn!("cannot delete phone: client {} not found", client_id);
            return Ok(PhoneRemoved::ClientNotFound);
        }

        let count = match self.variant {
            SchemaVariant::Normalized => self.conn.execute(
                "DELETE FROM phone WHERE client_id = ? AND number = ?",
                params![client_id, number],
            )?,
            SchemaVariant::Denormalized => self.conn.execute(
                "UPDATE client SET phone = NULL WHERE id = ? AND phone = ?",
                params![client_id, number],
            )?,
        };

        if count == 0 {
            log::warn!("client {} has no phone {}", client_id, number);
            return Ok(PhoneRemoved::PhoneNotFound);
        }
        log::info!("phone {} removed from client {}", number, client_id);
        Ok(PhoneRemoved::Removed { count })
    }
}
