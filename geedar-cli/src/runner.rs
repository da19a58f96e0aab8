//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and compute
//! client creation to reduce duplication across command handlers.

use tracing::info;

use geedar::compute::{AsyncReqwestClient, HttpComputeService};
use geedar::config::ConfigFile;
use geedar::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `verbose` - When true, log records are also written to stdout
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(
            &config.logging.directory,
            &config.logging.file,
            verbose,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("GEEDaR v{}", geedar::VERSION);
        info!("GEEDaR CLI: {} command", command);
    }

    /// Create the compute gateway client.
    ///
    /// Command-line values take precedence over the config file.
    pub fn create_service(
        &self,
        endpoint: Option<String>,
        token: Option<String>,
    ) -> Result<HttpComputeService<AsyncReqwestClient>, CliError> {
        let endpoint = endpoint.unwrap_or_else(|| self.config.compute.endpoint.clone());
        let token = token.or_else(|| self.config.compute.token.clone());

        let client = AsyncReqwestClient::with_timeout(self.config.compute.timeout_secs)?;
        let mut service = HttpComputeService::new(client, endpoint);
        if let Some(token) = token {
            service = service.with_token(token);
        }
        info!(endpoint = service.endpoint(), "Compute gateway configured");
        Ok(service)
    }
}
