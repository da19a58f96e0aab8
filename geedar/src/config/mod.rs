//! Configuration.
//!
//! Two layers:
//!
//! - [`RetrievalConfig`]: the validated parameters of one retrieval run,
//!   built in code with `with_*` methods
//! - [`ConfigFile`]: the user's `~/.geedar/config.ini`, whose sections
//!   provide defaults for the CLI
//!
//! # Example
//!
//! ```
//! use geedar::config::RetrievalConfig;
//!
//! let config = RetrievalConfig::new()
//!     .with_time_window(2)
//!     .with_append_mode(true);
//! assert_eq!(config.max_pixels_per_request(), 25_000);
//! assert_eq!(config.time_window(), 2);
//! ```

mod defaults;
mod file;
mod parser;
mod retrieval;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use retrieval::RetrievalConfig;
pub use settings::{ComputeSettings, ConfigFile, LoggingSettings, RetrievalSettings, RetrySettings};
