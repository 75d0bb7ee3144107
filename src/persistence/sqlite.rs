use super::{HatimRepository, PersistenceError, PersistenceResult};
use crate::dates;
use crate::hatim::{Hatim, HatimId, HatimPatch, NewHatim};
use crate::participant::Participant;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "SELECT id, name, start_date, end_date, participants, user_id, created_at FROM hatims";

pub struct SqliteHatimRepository {
    connection: Mutex<Connection>,
}

struct HatimRow {
    id: String,
    name: String,
    start_date: Option<String>,
    end_date: Option<String>,
    participants: String,
    user_id: Option<String>,
    created_at: String,
}

impl HatimRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            start_date: row.get(2)?,
            end_date: row.get(3)?,
            participants: row.get(4)?,
            user_id: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_hatim(self) -> PersistenceResult<Hatim> {
        let participants: Vec<Participant> = serde_json::from_str(&self.participants)?;
        let created = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|err| {
                PersistenceError::InvalidData(format!(
                    "invalid created_at '{}': {err}",
                    self.created_at
                ))
            })?
            .with_timezone(&Utc);
        Ok(Hatim {
            id: HatimId::Remote(self.id),
            name: self.name,
            start_date: parse_date_column(self.start_date)?,
            end_date: parse_date_column(self.end_date)?,
            participants,
            owner: self.user_id,
            created,
        })
    }
}

impl SqliteHatimRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS hatims (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                start_date TEXT,
                end_date TEXT,
                participants TEXT NOT NULL DEFAULT '[]',
                user_id TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS hatims_user_id ON hatims (user_id, created_at);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl HatimRepository for SqliteHatimRepository {
    fn list_by_owner(&self, owner: &str) -> PersistenceResult<Vec<Hatim>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![owner], HatimRow::from_row)?;

        let mut hatims = Vec::new();
        for row in rows {
            hatims.push(row?.into_hatim()?);
        }
        Ok(hatims)
    }

    fn get_by_id(&self, id: &str) -> PersistenceResult<Option<Hatim>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let row = stmt
            .query_row(params![id], HatimRow::from_row)
            .optional()?;
        row.map(HatimRow::into_hatim).transpose()
    }

    fn insert(&self, hatim: &NewHatim) -> PersistenceResult<Hatim> {
        let id = Uuid::new_v4().to_string();
        let participants = serde_json::to_string(&hatim.participants)?;
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO hatims (id, name, start_date, end_date, participants, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                hatim.name,
                format_date_column(hatim.start_date),
                format_date_column(hatim.end_date),
                participants,
                hatim.owner,
                hatim.created.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        debug!(hatim_id = %id, "inserted hatim row");
        Ok(hatim.clone().into_hatim(HatimId::Remote(id)))
    }

    fn update(&self, id: &str, patch: &HatimPatch) -> PersistenceResult<()> {
        let mut assignments = Vec::new();
        let mut values = Vec::new();
        if let Some(name) = &patch.name {
            assignments.push("name");
            values.push(Value::Text(name.clone()));
        }
        if let Some(start_date) = patch.start_date {
            assignments.push("start_date");
            values.push(date_value(start_date));
        }
        if let Some(end_date) = patch.end_date {
            assignments.push("end_date");
            values.push(date_value(end_date));
        }
        if let Some(participants) = &patch.participants {
            assignments.push("participants");
            values.push(Value::Text(serde_json::to_string(participants)?));
        }
        if assignments.is_empty() {
            return Ok(());
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(idx, column)| format!("{column} = ?{}", idx + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE hatims SET {set_clause} WHERE id = ?{}",
            assignments.len() + 1
        );
        values.push(Value::Text(id.to_string()));

        let conn = self.connection.lock();
        let changed = conn.execute(&sql, params_from_iter(values))?;
        debug!(hatim_id = id, changed, "updated hatim row");
        Ok(())
    }

    fn delete(&self, id: &str) -> PersistenceResult<()> {
        let conn = self.connection.lock();
        let changed = conn.execute("DELETE FROM hatims WHERE id = ?1", params![id])?;
        debug!(hatim_id = id, changed, "deleted hatim row");
        Ok(())
    }
}

fn format_date_column(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn date_value(date: Option<NaiveDate>) -> Value {
    match format_date_column(date) {
        Some(text) => Value::Text(text),
        None => Value::Null,
    }
}

fn parse_date_column(value: Option<String>) -> PersistenceResult<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => dates::parse_date(&text)
            .map(Some)
            .ok_or_else(|| PersistenceError::InvalidData(format!("invalid date '{text}'"))),
    }
}
