//! Mock algorithm repository for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::algorithm::{Algorithm, AlgorithmRepository, RepositoryError};

/// A recorded repository query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedQuery {
    FindByName { name: String },
    FindById { id: u32 },
    FindByCategory { category: String },
}

/// In-memory implementation of the AlgorithmRepository trait.
///
/// Provides controllable behavior for testing:
/// - Serve a configurable set of algorithms
/// - Track queries for assertions
/// - Simulate store failures
///
/// # Example
///
/// ```rust,ignore
/// use cubealg_core::testing::{fixtures, MockAlgorithmRepository};
///
/// let repo = MockAlgorithmRepository::with_algorithms(fixtures::catalog());
/// let ua = repo.find_by_name("Ua Perm").await?.unwrap();
/// assert_eq!(ua.id, 5);
///
/// repo.fail_with(RepositoryError::Connection("down".into())).await;
/// assert!(repo.find_by_id(1).await.is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockAlgorithmRepository {
    algorithms: Arc<RwLock<Vec<Algorithm>>>,
    queries: Arc<RwLock<Vec<RecordedQuery>>>,
    /// When set, every query fails with a copy of this error.
    failure: Arc<RwLock<Option<RepositoryError>>>,
}

impl MockAlgorithmRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock repository serving the given algorithms.
    pub fn with_algorithms(algorithms: Vec<Algorithm>) -> Self {
        Self {
            algorithms: Arc::new(RwLock::new(algorithms)),
            ..Self::default()
        }
    }

    /// Replace the served algorithms.
    pub async fn set_algorithms(&self, algorithms: Vec<Algorithm>) {
        *self.algorithms.write().await = algorithms;
    }

    /// Add a single algorithm.
    pub async fn add_algorithm(&self, algorithm: Algorithm) {
        self.algorithms.write().await.push(algorithm);
    }

    /// Make every subsequent query fail.
    pub async fn fail_with(&self, error: RepositoryError) {
        *self.failure.write().await = Some(error);
    }

    /// Stop failing queries.
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Get recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    async fn record(&self, query: RecordedQuery) -> Result<(), RepositoryError> {
        self.queries.write().await.push(query);

        match &*self.failure.read().await {
            Some(RepositoryError::Connection(msg)) => Err(RepositoryError::Connection(msg.clone())),
            Some(RepositoryError::Query(msg)) => Err(RepositoryError::Query(msg.clone())),
            Some(RepositoryError::Decode(msg)) => Err(RepositoryError::Decode(msg.clone())),
            None => Ok(()),
        }
    }

    async fn matching(&self, predicate: impl Fn(&Algorithm) -> bool) -> Vec<Algorithm> {
        self.algorithms
            .read()
            .await
            .iter()
            .filter(|a| predicate(a))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AlgorithmRepository for MockAlgorithmRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Algorithm>, RepositoryError> {
        self.record(RecordedQuery::FindByName {
            name: name.to_string(),
        })
        .await?;
        let matches = self.matching(|a| a.name == name).await;
        Ok(crate::algorithm::last_match(matches))
    }

    async fn find_by_id(&self, id: u32) -> Result<Option<Algorithm>, RepositoryError> {
        self.record(RecordedQuery::FindById { id }).await?;
        let matches = self.matching(|a| a.id == id).await;
        Ok(crate::algorithm::last_match(matches))
    }

    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Algorithm>, RepositoryError> {
        self.record(RecordedQuery::FindByCategory {
            category: category.to_string(),
        })
        .await?;
        Ok(self.matching(|a| a.category == category).await)
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
