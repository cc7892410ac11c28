//! Core module - fundamental types and configuration

pub mod config;
pub mod project;
pub mod status;
pub mod tcid;

pub use config::{Config, ConfigError, HeaderTemplate, RemapEntry};
pub use project::{Project, ProjectError};
pub use status::Status;
pub use tcid::{Tcid, TcidParseError};
