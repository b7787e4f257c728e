//! hapi-config: layered properties configuration for a FHIR JPA server
//!
//! Loads a bundled `hapi.properties`, overlays an optional override file named
//! through the `hapi.properties` / `HAPI_PROPERTIES` environment setting, and
//! resolves every server parameter to a typed value with a declared default.

pub mod cli;
pub mod config;
pub mod domain;

pub use config::{catalog, ConfigError, ConfigurationStore, Param, Result, Sources};
pub use domain::{ConfigEnum, ETagSupport, Encoding, FhirVersion, Origin, RawConfiguration};
