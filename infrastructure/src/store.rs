use chrono::Utc;
use domain::organization::Organization;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use serde::{Deserialize, Serialize};
use shared::types::{CoreError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A user document in an organization's `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub password: String,
    pub created_at: String,
    pub modifications: u32,
    pub static_answers: Vec<String>,
}

/// Per-organization persistent store: a `users` collection plus a blob store
/// keyed by string, both living in one database file per tenant.
pub struct TenantStore {
    conn: Mutex<Connection>,
    organization: Organization,
}

impl TenantStore {
    pub fn open(path: impl AsRef<Path>, organization: Organization) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::setup_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            organization,
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory(organization: Organization) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            organization,
        })
    }

    fn setup_db(conn: &Connection) -> SqlResult<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS users (
                name TEXT PRIMARY KEY,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL,
                modifications INTEGER NOT NULL DEFAULT 0,
                static_answers TEXT NOT NULL DEFAULT '[]'
            );
            CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL
            );
        ",
        )?;
        Ok(())
    }

    pub fn organization(&self) -> Organization {
        self.organization
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Storage("tenant store lock poisoned".to_string()))
    }

    pub fn find_user(&self, name: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT name, password, created_at, modifications, static_answers
                 FROM users WHERE name = ?1",
                [name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((name, password, created_at, modifications, answers_json)) = row else {
            return Ok(None);
        };
        let static_answers: Vec<String> = serde_json::from_str(&answers_json)?;
        Ok(Some(UserRecord {
            name,
            password,
            created_at,
            modifications,
            static_answers,
        }))
    }

    pub fn insert_user(&self, name: &str, password: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (name, password, created_at) VALUES (?1, ?2, ?3)",
            params![name, password, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn update_static_answers(&self, name: &str, answers: &[String]) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET static_answers = ?2 WHERE name = ?1",
            params![name, serde_json::to_string(answers)?],
        )?;
        if updated == 0 {
            return Err(CoreError::NotFound(format!("user {name} not found")));
        }
        Ok(())
    }

    pub fn bump_modifications(&self, name: &str) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET modifications = modifications + 1 WHERE name = ?1",
            [name],
        )?;
        if updated == 0 {
            return Err(CoreError::NotFound(format!("user {name} not found")));
        }
        Ok(())
    }

    /// Returns true when a user document was actually removed.
    pub fn delete_user(&self, name: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE name = ?1", [name])?;
        Ok(deleted > 0)
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, password, created_at, modifications, static_answers
             FROM users ORDER BY name",
        )?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            let answers_json: String = row.get(4)?;
            users.push(UserRecord {
                name: row.get(0)?,
                password: row.get(1)?,
                created_at: row.get(2)?,
                modifications: row.get(3)?,
                static_answers: serde_json::from_str(&answers_json)?,
            });
        }
        Ok(users)
    }

    pub fn put_blob(&self, key: &str, data: &[u8]) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO blobs (key, data) VALUES (?1, ?2)",
            params![key, data],
        )?;
        Ok(())
    }

    pub fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn()?;
        let data = conn
            .query_row("SELECT data FROM blobs WHERE key = ?1", [key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(data)
    }

    /// Returns true when a blob was actually removed.
    pub fn delete_blob(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM blobs WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }
}

/// One `TenantStore` per organization, constructed once at process start and
/// passed by reference to all data-access calls.
pub struct StoreRegistry {
    stores: HashMap<Organization, TenantStore>,
}

impl StoreRegistry {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let mut stores = HashMap::new();
        for org in Organization::ALL {
            let path = data_dir.as_ref().join(format!("{}.db", org.key()));
            stores.insert(org, TenantStore::open(path, org)?);
        }
        Ok(Self { stores })
    }

    /// All-in-memory registry, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let mut stores = HashMap::new();
        for org in Organization::ALL {
            stores.insert(org, TenantStore::open_in_memory(org)?);
        }
        Ok(Self { stores })
    }

    pub fn store(&self, organization: Organization) -> &TenantStore {
        // Every organization is opened at construction time.
        &self.stores[&organization]
    }
}
