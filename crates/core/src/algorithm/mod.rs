//! Algorithm catalog - read-only access to the algorithm records.
//!
//! Records are written out-of-band into the document store; this crate only
//! queries them by equality on a single field.

mod credentials;
mod firestore;
mod sqlite;
mod types;

pub use firestore::FirestoreRepository;
pub use sqlite::SqliteRepository;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};

/// Errors for algorithm store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed the query.
    #[error("Query failed: {0}")]
    Query(String),

    /// A document could not be mapped to an algorithm.
    #[error("Failed to decode document: {0}")]
    Decode(String),
}

/// Trait for algorithm record storage.
///
/// Lookups by name and id return `None` when nothing matches. When several
/// documents match, the last one the store yields wins; the store gives no
/// ordering guarantee, so duplicate names or ids resolve arbitrarily.
#[async_trait]
pub trait AlgorithmRepository: Send + Sync {
    /// Find the algorithm whose `name` equals `name`.
    async fn find_by_name(&self, name: &str) -> Result<Option<Algorithm>, RepositoryError>;

    /// Find the algorithm whose `id` equals `id`.
    async fn find_by_id(&self, id: u32) -> Result<Option<Algorithm>, RepositoryError>;

    /// List every algorithm in `category`. Empty when the category is unknown.
    async fn find_by_category(&self, category: &str)
        -> Result<Vec<Algorithm>, RepositoryError>;

    /// Short backend label for logs and metrics.
    fn backend_name(&self) -> &'static str;
}

/// Factory function to create the configured repository
pub fn create_repository(
    config: &StoreConfig,
) -> Result<Box<dyn AlgorithmRepository>, RepositoryError> {
    match config.backend {
        StoreBackend::Firestore => Ok(Box::new(FirestoreRepository::new(
            config.firestore.clone(),
        )?)),
        StoreBackend::Sqlite => {
            let repo = SqliteRepository::new(&config.sqlite.path)?;
            if let Some(seed_file) = &config.sqlite.seed_file {
                repo.import_json_file(seed_file)?;
            }
            Ok(Box::new(repo))
        }
    }
}

/// Resolve a list of matches to the single-record answer.
pub(crate) fn last_match(matches: Vec<Algorithm>) -> Option<Algorithm> {
    matches.into_iter().last().filter(Algorithm::has_id)
}
