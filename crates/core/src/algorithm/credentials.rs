//! Bearer tokens for Firestore requests.
//!
//! A token comes from one of three places: nowhere (emulator, public rules),
//! a fixed config value, or the GCE metadata server. Metadata tokens are
//! cached and refetched shortly before they expire.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::RepositoryError;
use crate::config::FirestoreConfig;

/// Refetch a metadata token once it has less than this left.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

pub(crate) enum TokenSource {
    None,
    Static(String),
    Metadata(MetadataTokenSource),
}

impl TokenSource {
    /// A non-empty `access_token` wins over the metadata server.
    pub(crate) fn from_config(config: &FirestoreConfig, client: Client) -> Self {
        match config.access_token.as_deref() {
            Some(token) if !token.is_empty() => TokenSource::Static(token.to_string()),
            _ if config.use_metadata_server => {
                TokenSource::Metadata(MetadataTokenSource::new(client, &config.metadata_url))
            }
            _ => TokenSource::None,
        }
    }

    /// Token to attach to the next request, if any.
    pub(crate) async fn token(&self) -> Result<Option<String>, RepositoryError> {
        match self {
            TokenSource::None => Ok(None),
            TokenSource::Static(token) => Ok(Some(token.clone())),
            TokenSource::Metadata(source) => source.token().await.map(Some),
        }
    }

    /// Drop a cached token the store rejected.
    pub(crate) async fn invalidate(&self) {
        if let TokenSource::Metadata(source) = self {
            *source.cached.lock().await = None;
        }
    }
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

pub(crate) struct MetadataTokenSource {
    client: Client,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataTokenSource {
    fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            cached: Mutex::new(None),
        }
    }

    async fn token(&self) -> Result<String, RepositoryError> {
        // Held across the fetch so concurrent requests share one refresh
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(token.access_token.clone());
            }
        }

        let fetched = self.fetch().await?;
        info!(expires_in = fetched.expires_in, "Fetched access token from metadata server");

        let access_token = fetched.access_token.clone();
        *cached = Some(CachedToken {
            access_token: fetched.access_token,
            expires_at: Instant::now() + Duration::from_secs(fetched.expires_in),
        });
        Ok(access_token)
    }

    async fn fetch(&self) -> Result<MetadataTokenResponse, RepositoryError> {
        debug!(url = %self.url, "Requesting access token");

        let response = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(format!("Metadata server: {}", e)))?;

        if !response.status().is_success() {
            return Err(RepositoryError::Connection(format!(
                "Metadata server returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RepositoryError::Decode(format!("Invalid metadata token: {}", e)))
    }
}
