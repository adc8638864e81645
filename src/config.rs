//! Configuration types.

use crate::error::ConfigError;
use crate::onboarding::state::{MIN_STEP_COUNT, UPLOAD_STEP};

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Number of step panels (at least welcome, selection, upload).
    pub step_count: u32,
    /// Storage scope the snapshot lives under (one scope per browser profile).
    pub storage_scope: String,
    /// Where `complete_onboarding` hands the user off to. Unset keeps them on the wizard.
    pub dashboard_url: Option<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            step_count: UPLOAD_STEP + 1,
            storage_scope: "default".to_string(),
            dashboard_url: None,
        }
    }
}

impl WizardConfig {
    /// Reject layouts that have no room for the selection and upload steps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_count < MIN_STEP_COUNT {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARDING_STEP_COUNT".to_string(),
                message: format!(
                    "{} is too small, the wizard needs at least {MIN_STEP_COUNT} steps",
                    self.step_count
                ),
            });
        }
        Ok(())
    }
}

/// Server configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// libSQL database file, or `:memory:`.
    pub db_path: String,
    pub wizard: WizardConfig,
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("ONBOARDING_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let db_path = std::env::var("ONBOARDING_DB_PATH")
            .unwrap_or_else(|_| "./data/onboarding.db".to_string());

        let defaults = WizardConfig::default();

        let step_count = match std::env::var("ONBOARDING_STEP_COUNT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "ONBOARDING_STEP_COUNT".to_string(),
                message: format!("{raw:?} is not a step count"),
            })?,
            Err(_) => defaults.step_count,
        };

        let storage_scope = std::env::var("ONBOARDING_STORAGE_SCOPE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.storage_scope);

        let dashboard_url = std::env::var("ONBOARDING_DASHBOARD_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let wizard = WizardConfig {
            step_count,
            storage_scope,
            dashboard_url,
        };
        wizard.validate()?;

        Ok(Self {
            port,
            db_path,
            wizard,
        })
    }
}
