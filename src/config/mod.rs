use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Google Apps Script Web App endpoint receiving submissions
    pub sheets_endpoint_url: String,

    /// Sheet tab receiving client records
    #[serde(default = "default_client_sheet_tab")]
    pub client_sheet_tab: String,

    /// Sheet tab receiving lead records
    #[serde(default = "default_lead_sheet_tab")]
    pub lead_sheet_tab: String,

    /// Transport strategy: "direct" or "form-post"
    #[serde(default = "default_submit_transport")]
    pub submit_transport: String,

    /// Maximum delivery attempts per transport
    #[serde(default = "default_submit_max_attempts")]
    pub submit_max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(default = "default_submit_retry_delay_ms")]
    pub submit_retry_delay_ms: u64,

    /// Logging verbosity (tracing env-filter syntax)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log destination; the terminal is owned by the UI
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_client_sheet_tab() -> String {
    "Clientes".to_string()
}

fn default_lead_sheet_tab() -> String {
    "Leads".to_string()
}

fn default_submit_transport() -> String {
    "direct".to_string()
}

fn default_submit_max_attempts() -> u32 {
    3
}

fn default_submit_retry_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "intake_manager.log".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Parse environment variables into Config struct
        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.submit_retry_delay_ms)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    // Load the configuration
    let config = Config::load()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_endpoint() {
        let config: Config = envy::from_iter(vec![(
            "SHEETS_ENDPOINT_URL".to_string(),
            "https://script.google.com/macros/s/abc/exec".to_string(),
        )])
        .unwrap();

        assert_eq!(config.client_sheet_tab, "Clientes");
        assert_eq!(config.lead_sheet_tab, "Leads");
        assert_eq!(config.submit_transport, "direct");
        assert_eq!(config.submit_max_attempts, 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(2000));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let result = envy::from_iter::<_, Config>(Vec::<(String, String)>::new());
        assert!(result.is_err());
    }
}
