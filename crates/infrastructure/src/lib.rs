//! Assay Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus suite file and settings loading.

pub mod adapters;
pub mod persistence;
pub mod serialization;
pub mod settings;

pub use adapters::ReqwestHttpClient;
pub use persistence::{LoadError, SuiteFormat, load_suite, parse_suite, write_sample_suite};
pub use serialization::{SerializationError, to_json_stable};
pub use settings::{SettingsError, SettingsLoader};
