//! # AnalystAI
//!
//! HTTP bootstrap for the AnalystAI agent server.
//!
//! This library provides:
//! - A typed configuration loader backed by environment variables
//! - A per-component logger registry with console and rotating-file sinks
//! - The HTTP API surface hosting the `/agents` namespace
//!
//! ## Architecture
//!
//! Startup is a straight line:
//! 1. Load `Settings` from the environment (with an optional `.env` overlay)
//! 2. Build the `LoggerRegistry` from the logging settings
//! 3. Bind the axum server and serve the API
//!
//! Both bootstrap components are process-wide singletons in the running
//! binary, but are constructed as plain owned values so tests can build
//! isolated instances.
//!
//! ## Example
//!
//! ```rust,ignore
//! use analyst_ai::{config, logging::{Level, LoggerRegistry}};
//!
//! let settings = config::get_settings()?;
//! let registry = LoggerRegistry::new(settings);
//! let log = registry.get_logger("server", Level::Info)?;
//! log.info("starting up");
//! ```

pub mod api;
pub mod config;
pub mod logging;

pub use config::Settings;
