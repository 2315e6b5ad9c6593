//! Settings aggregation.
//!
//! # Module Structure
//!
//! - [`element`]: The two-method `ConfigurationElement` contract and the
//!   merge helper shared by typed elements
//! - [`elements`]: Built-in elements (hearing loss, calibration, audio and GPU
//!   device selection)
//! - [`store`]: Name-keyed registry persisted as one JSON document

pub mod element;
pub mod elements;
mod store;

pub use element::{ConfigurationElement, Settings, SettingsSnapshot};
pub use store::{ConfigurationDocument, ConfigurationStore, LoadOutcome};
