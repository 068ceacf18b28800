//! websift - aggregate many websites into a few shared object shapes.
//!
//! This library provides:
//! - Shared capability objects (accounts, torrents, subtitles, recipes,
//!   radios, movies, persons, chat messages) with tri-state fields
//! - A generic browsing core: transport abstraction, URL routing tables,
//!   session/login tracking, pagination
//! - One backend per supported site, each implementing the capability
//!   traits it can serve

pub mod backends;
pub mod browser;
pub mod capabilities;
pub mod config;
pub mod console;
pub mod error;
pub mod formatters;

// Re-export commonly used types
pub use backends::{Backend, BackendRegistry, fan_out};
pub use capabilities::{Field, full_id, parse_full_id};
pub use config::Config;
pub use console::Console;
pub use error::{AdapterError, ConfigError};
