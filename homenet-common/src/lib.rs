//! # Homenet Common Library
//!
//! Shared code for the homenet server:
//! - Configuration file loading and defaults
//! - Logging initialization
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
