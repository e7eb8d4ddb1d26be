use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Available store backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Firestore,
    Sqlite,
}

/// Document store configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub firestore: FirestoreConfig,
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

/// Cloud Firestore REST backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FirestoreConfig {
    /// Google Cloud project holding the catalog
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Firestore database id
    #[serde(default = "default_database")]
    pub database: String,
    /// Collection the algorithm documents live in
    #[serde(default = "default_collection")]
    pub collection: String,
    /// REST endpoint root (overridable for emulators and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Fixed OAuth2 bearer token; the emulator and public rules need none.
    /// Google access tokens expire after about an hour, so long-running
    /// deployments should use the metadata server instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Fetch and refresh tokens from the GCE metadata server
    /// (Cloud Run, GKE, Compute Engine). Ignored when `access_token` is set.
    #[serde(default)]
    pub use_metadata_server: bool,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            database: default_database(),
            collection: default_collection(),
            base_url: default_base_url(),
            access_token: None,
            use_metadata_server: false,
            metadata_url: default_metadata_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_project_id() -> String {
    "rubiks-cube-api".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "Algorithms".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_metadata_url() -> String {
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token"
        .to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Local SQLite backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// JSON array of algorithms imported on startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            seed_file: None,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("algorithms.db")
}

/// Random selector configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorConfig {
    /// How long a random pick stays current (default: one day)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_pll_initial")]
    pub pll_initial_index: u32,
    #[serde(default = "default_oll_initial")]
    pub oll_initial_index: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            pll_initial_index: default_pll_initial(),
            oll_initial_index: default_oll_initial(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    24 * 60 * 60
}

fn default_pll_initial() -> u32 {
    1
}

fn default_oll_initial() -> u32 {
    23
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub store: SanitizedStoreConfig,
    pub selector: SelectorConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStoreConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firestore: Option<SanitizedFirestoreConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite: Option<SqliteConfig>,
}

/// Sanitized Firestore config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedFirestoreConfig {
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub base_url: String,
    pub access_token_configured: bool,
    pub use_metadata_server: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let store = &config.store;
        Self {
            server: config.server.clone(),
            store: SanitizedStoreConfig {
                backend: match store.backend {
                    StoreBackend::Firestore => "firestore".to_string(),
                    StoreBackend::Sqlite => "sqlite".to_string(),
                },
                firestore: (store.backend == StoreBackend::Firestore).then(|| {
                    SanitizedFirestoreConfig {
                        project_id: store.firestore.project_id.clone(),
                        database: store.firestore.database.clone(),
                        collection: store.firestore.collection.clone(),
                        base_url: store.firestore.base_url.clone(),
                        access_token_configured: store
                            .firestore
                            .access_token
                            .as_ref()
                            .is_some_and(|t| !t.is_empty()),
                        use_metadata_server: store.firestore.use_metadata_server,
                        timeout_secs: store.firestore.timeout_secs,
                    }
                }),
                sqlite: (store.backend == StoreBackend::Sqlite).then(|| store.sqlite.clone()),
            },
            selector: config.selector.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.firestore.project_id, "rubiks-cube-api");
        assert_eq!(config.store.firestore.collection, "Algorithms");
        assert_eq!(config.selector.refresh_interval_secs, 86400);
        assert_eq!(config.selector.pll_initial_index, 1);
        assert_eq!(config.selector.oll_initial_index, 23);
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_sqlite_backend() {
        let toml = r#"
[store]
backend = "sqlite"

[store.sqlite]
path = "/data/cube.db"
seed_file = "/data/algorithms.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.sqlite.path.to_str().unwrap(), "/data/cube.db");
        assert_eq!(
            config.store.sqlite.seed_file.as_deref().and_then(|p| p.to_str()),
            Some("/data/algorithms.json")
        );
    }

    #[test]
    fn test_deserialize_metadata_server_credentials() {
        let toml = r#"
[store.firestore]
use_metadata_server = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.store.firestore.use_metadata_server);
        assert!(config.store.firestore.access_token.is_none());
        assert!(config
            .store
            .firestore
            .metadata_url
            .starts_with("http://metadata.google.internal/"));

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.store.firestore.unwrap().use_metadata_server);
    }

    #[test]
    fn test_deserialize_unknown_backend_fails() {
        let toml = r#"
[store]
backend = "mongodb"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let mut config = Config::default();
        config.store.firestore.access_token = Some("ya29.secret".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.store.backend, "firestore");
        let firestore = sanitized.store.firestore.as_ref().unwrap();
        assert!(firestore.access_token_configured);
        assert!(sanitized.store.sqlite.is_none());

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("ya29.secret"));
    }

    #[test]
    fn test_sanitized_config_sqlite_backend() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Sqlite;

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.store.backend, "sqlite");
        assert!(sanitized.store.firestore.is_none());
        assert_eq!(
            sanitized.store.sqlite.unwrap().path.to_str().unwrap(),
            "algorithms.db"
        );
    }
}
