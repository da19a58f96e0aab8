//! GEEDaR - batched retrieval of remote-sensing time series
//!
//! This library turns a table of sites and dates plus a list of processing
//! codes into a consolidated result table, by sending batched reduction
//! requests to a remote compute engine and surviving its failures.
//!
//! # High-Level API
//!
//! ```ignore
//! use geedar::code::{decode_all, CodecMode};
//! use geedar::compute::{AsyncReqwestClient, HttpComputeService};
//! use geedar::config::RetrievalConfig;
//! use geedar::geo::PointBuffer;
//! use geedar::input::{RunningMode, SiteDateExpander};
//! use geedar::orchestrator::Retriever;
//!
//! let plans = decode_all(&[20109021], CodecMode::Strict)?;
//! let mode = RunningMode::detect(&table);
//! let expansion = SiteDateExpander::new(mode)
//!     .with_time_window(1)
//!     .expand(&table, &PointBuffer::new(1000.0))?;
//!
//! let service = HttpComputeService::new(AsyncReqwestClient::new()?, "http://localhost:8080");
//! let report = Retriever::new(service, &RetrievalConfig::default())
//!     .run(&expansion, &plans)
//!     .await;
//! ```

pub mod code;
pub mod compute;
pub mod config;
pub mod context;
pub mod executor;
pub mod geo;
pub mod input;
pub mod logging;
pub mod orchestrator;
pub mod planner;
pub mod registry;
pub mod result;
pub mod retry;

/// Version of the GEEDaR library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
