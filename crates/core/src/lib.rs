pub mod algorithm;
pub mod config;
pub mod metrics;
pub mod selector;
pub mod testing;

pub use algorithm::{
    create_repository, Algorithm, AlgorithmFamily, AlgorithmRepository, FirestoreRepository,
    RepositoryError, SqliteRepository,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FirestoreConfig,
    SanitizedConfig, SelectorConfig, ServerConfig, SqliteConfig, StoreBackend, StoreConfig,
};
pub use selector::{Clock, DailySelector, RandomSelectors, SelectorState, SystemClock};
