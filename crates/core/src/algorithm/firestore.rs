//! Cloud Firestore backend over the REST `runQuery` endpoint.
//!
//! Every lookup is a structured query with a single `EQUAL` field filter on
//! the algorithms collection. Documents store their fields with lower-case
//! names (`videoid`, `shortnote`, ...).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::credentials::TokenSource;
use super::{last_match, Algorithm, AlgorithmRepository, RepositoryError};
use crate::config::FirestoreConfig;
use crate::metrics::record_store_query;

/// Firestore-backed algorithm repository.
pub struct FirestoreRepository {
    client: Client,
    query_url: String,
    collection: String,
    tokens: TokenSource,
}

impl FirestoreRepository {
    /// Create a repository for the configured project and collection.
    pub fn new(config: FirestoreConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let query_url = format!(
            "{}/projects/{}/databases/{}/documents:runQuery",
            config.base_url.trim_end_matches('/'),
            config.project_id,
            config.database
        );

        let tokens = TokenSource::from_config(&config, client.clone());

        Ok(Self {
            client,
            query_url,
            collection: config.collection,
            tokens,
        })
    }

    /// Run an equality query and decode every returned document.
    async fn query_equal(
        &self,
        operation: &str,
        field_path: &str,
        value: Value,
    ) -> Result<Vec<Algorithm>, RepositoryError> {
        let started = Instant::now();
        let result = self.run_query(field_path, value).await;
        record_store_query(self.backend_name(), operation, started, result.is_ok());
        result
    }

    async fn run_query(
        &self,
        field_path: &str,
        value: Value,
    ) -> Result<Vec<Algorithm>, RepositoryError> {
        let body = RunQueryRequest {
            structured_query: StructuredQuery {
                from: [CollectionSelector {
                    collection_id: &self.collection,
                }],
                filter: Filter {
                    field_filter: FieldFilter {
                        field: FieldReference { field_path },
                        op: "EQUAL",
                        value,
                    },
                },
            },
        };

        debug!(collection = %self.collection, field = field_path, "Querying Firestore");

        let mut request = self.client.post(&self.query_url).json(&body);
        if let Some(token) = self.tokens.token().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                RepositoryError::Connection(e.to_string())
            } else {
                RepositoryError::Query(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Query(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let items: Vec<RunQueryResponseItem> = response
            .json()
            .await
            .map_err(|e| RepositoryError::Decode(format!("Failed to parse response: {}", e)))?;

        let algorithms = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|doc| decode_document(&doc))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(matches = algorithms.len(), "Firestore query finished");
        Ok(algorithms)
    }
}

#[async_trait]
impl AlgorithmRepository for FirestoreRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Algorithm>, RepositoryError> {
        let matches = self
            .query_equal("find_by_name", "name", json!({ "stringValue": name }))
            .await?;
        Ok(last_match(matches))
    }

    async fn find_by_id(&self, id: u32) -> Result<Option<Algorithm>, RepositoryError> {
        // Firestore encodes 64-bit integers as strings
        let matches = self
            .query_equal("find_by_id", "id", json!({ "integerValue": id.to_string() }))
            .await?;
        Ok(last_match(matches))
    }

    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Algorithm>, RepositoryError> {
        self.query_equal(
            "find_by_category",
            "category",
            json!({ "stringValue": category }),
        )
        .await
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest<'a> {
    structured_query: StructuredQuery<'a>,
}

#[derive(Serialize)]
struct StructuredQuery<'a> {
    from: [CollectionSelector<'a>; 1],
    #[serde(rename = "where")]
    filter: Filter<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector<'a> {
    collection_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Filter<'a> {
    field_filter: FieldFilter<'a>,
}

#[derive(Serialize)]
struct FieldFilter<'a> {
    field: FieldReference<'a>,
    op: &'static str,
    value: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference<'a> {
    field_path: &'a str,
}

/// One element of the `runQuery` response stream. Elements carrying only a
/// `readTime` mark progress and hold no document.
#[derive(Deserialize)]
struct RunQueryResponseItem {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_document(doc: &Document) -> Result<Algorithm, RepositoryError> {
    let fields = &doc.fields;
    let decode = || -> Result<Algorithm, String> {
        Ok(Algorithm {
            id: integer_field(fields, "id")?,
            name: string_field(fields, "name")?,
            moves: string_field(fields, "moves")?,
            video_id: string_field(fields, "videoid")?,
            video_start: integer_field(fields, "videostart")?,
            video_end: integer_field(fields, "videoend")?,
            short_note: string_field(fields, "shortnote")?,
            category: string_field(fields, "category")?,
            image_url: if fields.contains_key("imageurl") {
                string_field(fields, "imageurl")?
            } else {
                // written under the struct field name by older tooling
                string_field(fields, "ImageUrl")?
            },
        })
    };

    decode().map_err(|e| RepositoryError::Decode(format!("{}: {}", doc.name, e)))
}

fn string_field(fields: &HashMap<String, Value>, key: &str) -> Result<String, String> {
    let Some(value) = fields.get(key) else {
        return Ok(String::new());
    };

    if let Some(s) = value.get("stringValue").and_then(Value::as_str) {
        Ok(s.to_string())
    } else if value.get("nullValue").is_some() {
        Ok(String::new())
    } else {
        Err(format!("field '{}' is not a string: {}", key, value))
    }
}

fn integer_field(fields: &HashMap<String, Value>, key: &str) -> Result<u32, String> {
    let Some(value) = fields.get(key) else {
        return Ok(0);
    };

    let number = if let Some(raw) = value.get("integerValue") {
        match raw {
            Value::String(s) => s.parse::<i64>().ok(),
            other => other.as_i64(),
        }
    } else if let Some(raw) = value.get("doubleValue").and_then(Value::as_f64) {
        (raw.fract() == 0.0).then_some(raw as i64)
    } else if value.get("nullValue").is_some() {
        Some(0)
    } else {
        None
    };

    number
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("field '{}' is not a non-negative integer: {}", key, value))
}
