//! Configuration loading and typed resolution
//!
//! The base `hapi.properties` is layered under an optional override file
//! (override wins per key) through figment, cached by
//! [`ConfigurationStore`], and resolved through the descriptor table in
//! [`catalog`].

pub mod catalog;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod properties;
pub mod store;

pub use catalog::{Descriptor, Param, ParamValue, CATALOG};
pub use error::{ConfigError, Result};
pub use loader::{load_configuration, BaseSource, OverrideSource, Sources};
pub use store::ConfigurationStore;
