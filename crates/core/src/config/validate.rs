use super::{types::Config, ConfigError, StoreBackend};
use crate::algorithm::AlgorithmFamily;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Firestore settings are usable when that backend is selected
/// - Selector interval is positive and initial indices sit in their family range
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.store.backend == StoreBackend::Firestore {
        let firestore = &config.store.firestore;
        if firestore.project_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.firestore.project_id cannot be empty".to_string(),
            ));
        }
        if firestore.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.firestore.collection cannot be empty".to_string(),
            ));
        }
        if firestore.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "store.firestore.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    if config.selector.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "selector.refresh_interval_secs cannot be 0".to_string(),
        ));
    }

    for (family, index) in [
        (AlgorithmFamily::Pll, config.selector.pll_initial_index),
        (AlgorithmFamily::Oll, config.selector.oll_initial_index),
    ] {
        if !family.id_range().contains(&index) {
            let range = family.id_range();
            return Err(ConfigError::ValidationError(format!(
                "selector.{}_initial_index must be within {}..={}, got {}",
                family.as_str(),
                range.start(),
                range.end(),
                index
            )));
        }
    }

    Ok(())
}
