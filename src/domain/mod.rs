//! Core domain types shared by the loader, the store and the CLI

pub mod enums;
pub mod raw;

pub use enums::{ConfigEnum, ETagSupport, Encoding, FhirVersion};
pub use raw::{Entry, Origin, RawConfiguration};
