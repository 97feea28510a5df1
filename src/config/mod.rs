//! Configuration management for the workbench.
//!
//! This module provides configuration loading, validation, and access through a singleton pattern.
//! Configuration is loaded from a JSON document under the "apiWorkbench" key and merged with defaults.

pub mod schema;

pub use schema::WorkbenchConfig;

use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::RwLock;

/// Global configuration instance.
///
/// This is lazily initialized on first access and can be updated when settings change.
static CONFIG: Lazy<RwLock<WorkbenchConfig>> =
    Lazy::new(|| RwLock::new(WorkbenchConfig::default()));

/// Loads configuration from a JSON settings value.
///
/// This function reads the "apiWorkbench" settings, merges them with defaults,
/// validates the result, and updates the global configuration.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value containing user settings under the "apiWorkbench" key
///
/// # Returns
///
/// `Ok(WorkbenchConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```no_run
/// use api_workbench::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "apiWorkbench": {
///         "timeout": 60000,
///         "retryAttempts": 3
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 60000);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<WorkbenchConfig, String> {
    let mut config = WorkbenchConfig::default();

    if let Some(settings) = settings_json {
        // Extract apiWorkbench settings if present
        if let Some(workbench_settings) = settings.get("apiWorkbench") {
            // Deserialize user settings
            match serde_json::from_value::<WorkbenchConfig>(workbench_settings.clone()) {
                Ok(user_config) => {
                    // Merge with defaults (user settings take precedence)
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    // Log error but continue with defaults
                    log::warn!(
                        "Failed to parse apiWorkbench settings: {}. Using defaults.",
                        e
                    );
                }
            }
        }
    }

    // Validate the merged configuration
    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}. Using defaults.", e))?;

    // Update the global configuration
    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Gets the current global configuration.
///
/// This is a singleton accessor that returns a clone of the current configuration.
/// If configuration has not been loaded yet, returns the default configuration.
///
/// # Returns
///
/// A cloned `WorkbenchConfig` instance.
///
/// # Example
///
/// ```no_run
/// use api_workbench::config::get_config;
///
/// let config = get_config();
/// println!("Timeout: {}ms", config.timeout);
/// ```
pub fn get_config() -> WorkbenchConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| WorkbenchConfig::default())
}

/// Updates a specific configuration setting.
///
/// This allows for granular updates to the configuration without replacing
/// the entire config object.
///
/// # Arguments
///
/// * `updater` - A closure that modifies the configuration
///
/// # Example
///
/// ```no_run
/// use api_workbench::config::update_config;
///
/// update_config(|config| {
///     config.timeout = 60000;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut WorkbenchConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        // Validate after update
        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            // Revert to defaults if validation fails
            *config = WorkbenchConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
///
/// This is useful for testing or when the user wants to clear custom settings.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = WorkbenchConfig::default();
    }
}
