//! SQLite-backed algorithm repository for local development and offline use.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row, ToSql};
use tracing::{debug, info};

use super::{last_match, Algorithm, AlgorithmRepository, RepositoryError};
use crate::metrics::record_store_query;

const SELECT_COLUMNS: &str = "SELECT id, name, moves, video_id, video_start, video_end, \
     short_note, category, image_url FROM algorithms";

/// SQLite-backed algorithm repository.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database file and its table.
    pub fn new(path: &Path) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path).map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory repository (useful for testing).
    pub fn in_memory() -> Result<Self, RepositoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RepositoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS algorithms (
                name TEXT PRIMARY KEY,
                id INTEGER NOT NULL,
                moves TEXT NOT NULL DEFAULT '',
                video_id TEXT NOT NULL DEFAULT '',
                video_start INTEGER NOT NULL DEFAULT 0,
                video_end INTEGER NOT NULL DEFAULT 0,
                short_note TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_algorithms_id ON algorithms(id);
            CREATE INDEX IF NOT EXISTS idx_algorithms_category ON algorithms(category);
            "#,
        )
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::Connection(format!("Lock poisoned: {}", e)))
    }

    /// Insert an algorithm, replacing any existing record with the same name.
    pub fn insert(&self, algorithm: &Algorithm) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO algorithms
             (name, id, moves, video_id, video_start, video_end, short_note, category, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                algorithm.name,
                algorithm.id,
                algorithm.moves,
                algorithm.video_id,
                algorithm.video_start,
                algorithm.video_end,
                algorithm.short_note,
                algorithm.category,
                algorithm.image_url,
            ],
        )
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    /// Import a JSON array of algorithms. Returns the number of records written.
    pub fn import_json_file(&self, path: &Path) -> Result<usize, RepositoryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::Connection(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let algorithms: Vec<Algorithm> = serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::Decode(format!("Invalid seed file {}: {}", path.display(), e))
        })?;

        for algorithm in &algorithms {
            self.insert(algorithm)?;
        }

        info!(count = algorithms.len(), path = %path.display(), "Imported algorithms");
        Ok(algorithms.len())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Algorithm> {
        Ok(Algorithm {
            id: row.get(0)?,
            name: row.get(1)?,
            moves: row.get(2)?,
            video_id: row.get(3)?,
            video_start: row.get(4)?,
            video_end: row.get(5)?,
            short_note: row.get(6)?,
            category: row.get(7)?,
            image_url: row.get(8)?,
        })
    }

    /// Select every row where `column` equals `value`, oldest insert first.
    fn select_where(
        &self,
        operation: &str,
        column: &str,
        value: &dyn ToSql,
    ) -> Result<Vec<Algorithm>, RepositoryError> {
        let started = Instant::now();
        let result = self.select_rows(column, value);
        record_store_query(self.backend_name(), operation, started, result.is_ok());
        result
    }

    fn select_rows(&self, column: &str, value: &dyn ToSql) -> Result<Vec<Algorithm>, RepositoryError> {
        let conn = self.lock()?;
        let sql = format!("{} WHERE {} = ?1 ORDER BY rowid", SELECT_COLUMNS, column);
        debug!(column, "Querying SQLite");

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([value], Self::map_row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut algorithms = Vec::new();
        for row in rows {
            algorithms.push(row.map_err(|e| RepositoryError::Decode(e.to_string()))?);
        }
        Ok(algorithms)
    }
}

#[async_trait]
impl AlgorithmRepository for SqliteRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Algorithm>, RepositoryError> {
        Ok(last_match(self.select_where("find_by_name", "name", &name)?))
    }

    async fn find_by_id(&self, id: u32) -> Result<Option<Algorithm>, RepositoryError> {
        Ok(last_match(self.select_where("find_by_id", "id", &id)?))
    }

    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Algorithm>, RepositoryError> {
        self.select_where("find_by_category", "category", &category)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
