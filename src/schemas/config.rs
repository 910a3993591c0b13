//! Config schema - Configuration for parcours

use serde::{Deserialize, Serialize};

/// Case-management API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStatusConfig {
    /// GraphQL endpoint of the case-management service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Timeout in seconds for one status read
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,

    /// Public link to a case, `{number}` is replaced by the case number
    #[serde(default = "default_dossier_url_template")]
    pub dossier_url_template: String,
}

impl Default for CaseStatusConfig {
    fn default() -> Self {
        CaseStatusConfig {
            endpoint: default_endpoint(),
            token_env: default_token_env(),
            timeout_seconds: default_timeout_seconds(),
            dossier_url_template: default_dossier_url_template(),
        }
    }
}

/// Periodic sync settings for the `watch` driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between two sync sweeps
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_seconds: default_interval_seconds(),
        }
    }
}

/// Main configuration for parcours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub case_status: CaseStatusConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

fn default_schema_version() -> u32 {
    1
}

fn default_endpoint() -> String {
    "https://www.demarches-simplifiees.fr/api/v2/graphql".to_string()
}

fn default_token_env() -> String {
    "PARCOURS_DS_TOKEN".to_string()
}

fn default_timeout_seconds() -> u32 {
    15
}

fn default_dossier_url_template() -> String {
    "https://www.demarches-simplifiees.fr/dossiers/{number}".to_string()
}

fn default_interval_seconds() -> u32 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_version: 1,
            case_status: CaseStatusConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}
