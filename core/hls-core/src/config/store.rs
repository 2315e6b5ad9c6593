//! Name-keyed registry of configuration elements backed by one JSON document.
//!
//! # File Format
//!
//! ```json
//! {
//!     "calibration": { "spl_calibration_at_zero_dbfs": 94.0 },
//!     "gpudevice": { "platform_index": 0, "device_index": 0 }
//! }
//! ```
//!
//! Each top-level key belongs to one element and its value is opaque to the
//! store. The document carries no version field.
//!
//! # Load Semantics
//!
//! Loading is all-or-nothing: the file is parsed and shape-checked before any
//! element is touched, and if an element rejects its entry every element
//! already updated is restored to its previous snapshot.
//!
//! # Atomic Writes
//!
//! Uses temp file + rename so an interrupted save never leaves a truncated file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use super::element::{ConfigurationElement, Settings};
use super::elements::{
    AudioDeviceSelection, Calibration, GpuDeviceSelection, HearingLossParameter, AUDIO_DEVICE,
    CALIBRATION, GPU_DEVICE, HEARING_LOSS,
};
use crate::error::{HlsError, Result};
use crate::storage::StorageConfig;

/// Aggregate of every element's snapshot, keyed by element name.
pub type ConfigurationDocument = BTreeMap<String, Settings>;

/// What a successful [`ConfigurationStore::load`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file on disk; every element keeps its defaults.
    Missing,
    Loaded {
        /// Elements updated from the document.
        applied: Vec<String>,
        /// Document keys with no registered element.
        ignored: Vec<String>,
    },
}

pub struct ConfigurationStore {
    elements: BTreeMap<String, Box<dyn ConfigurationElement>>,
    storage: StorageConfig,
}

impl ConfigurationStore {
    /// Creates an empty registry persisting to `storage`.
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            elements: BTreeMap::new(),
            storage,
        }
    }

    /// Creates a registry holding the four built-in elements at their defaults.
    pub fn with_builtin_elements(storage: StorageConfig) -> Self {
        let mut store = Self::new(storage);
        store.insert(AUDIO_DEVICE, Box::<AudioDeviceSelection>::default());
        store.insert(GPU_DEVICE, Box::<GpuDeviceSelection>::default());
        store.insert(HEARING_LOSS, Box::<HearingLossParameter>::default());
        store.insert(CALIBRATION, Box::<Calibration>::default());
        store
    }

    fn insert(&mut self, name: &str, element: Box<dyn ConfigurationElement>) {
        self.elements.insert(name.to_string(), element);
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers an element under a unique name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        element: Box<dyn ConfigurationElement>,
    ) -> Result<()> {
        let name = name.into();
        if self.elements.contains_key(&name) {
            return Err(HlsError::DuplicateElement(name));
        }
        tracing::debug!(element = %name, "Registered configuration element");
        self.elements.insert(name, element);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn element(&self, name: &str) -> Option<&dyn ConfigurationElement> {
        self.elements.get(name).map(|element| element.as_ref())
    }

    /// Current snapshot of one element.
    pub fn snapshot(&self, name: &str) -> Result<Settings> {
        self.element(name)
            .map(|element| element.get_configuration())
            .ok_or_else(|| HlsError::UnknownElement(name.to_string()))
    }

    /// Current snapshot of every element.
    pub fn document(&self) -> ConfigurationDocument {
        self.elements
            .iter()
            .map(|(name, element)| (name.clone(), element.get_configuration()))
            .collect()
    }

    /// Applies `settings` to one element through its `set_configuration`.
    pub fn apply(&mut self, name: &str, settings: &Settings) -> Result<()> {
        let element = self
            .elements
            .get_mut(name)
            .ok_or_else(|| HlsError::UnknownElement(name.to_string()))?;
        element.set_configuration(settings)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────────

    /// Writes every element's snapshot to the configuration file.
    ///
    /// Creates the application directory when missing. Returns the written path.
    pub fn save(&self) -> Result<PathBuf> {
        let path = self.storage.config_file();
        let write_failed = |source: std::io::Error| HlsError::ConfigWriteFailed {
            path: path.clone(),
            source,
        };

        self.storage.ensure_dirs().map_err(write_failed)?;
        let content = to_indented_json(&self.document())?;

        let mut temp_file = NamedTempFile::new_in(self.storage.root()).map_err(write_failed)?;
        temp_file.write_all(&content).map_err(write_failed)?;
        temp_file.flush().map_err(write_failed)?;
        temp_file
            .persist(&path)
            .map_err(|err| write_failed(err.error))?;

        tracing::info!(path = %path.display(), elements = self.elements.len(), "Configuration saved");
        Ok(path)
    }

    /// Restores element state from the configuration file.
    ///
    /// A missing file is not an error. A file that cannot be read, parsed, or
    /// applied in full leaves every element as it was.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        let path = self.storage.config_file();
        let exists = path.try_exists().map_err(|source| HlsError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        if !exists {
            tracing::debug!(path = %path.display(), "No configuration file, keeping defaults");
            return Ok(LoadOutcome::Missing);
        }

        let content = fs_err::read_to_string(&path).map_err(|source| HlsError::ConfigRead {
            path: path.clone(),
            source,
        })?;

        let document: serde_json::Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| HlsError::ConfigMalformed {
                path: path.clone(),
                details: e.to_string(),
            })?;

        let mut updates: Vec<(&str, &Settings)> = Vec::new();
        let mut ignored = Vec::new();
        for (name, value) in &document {
            if !self.elements.contains_key(name) {
                tracing::debug!(element = %name, "Ignoring unregistered configuration entry");
                ignored.push(name.clone());
                continue;
            }
            let settings = value
                .as_object()
                .ok_or_else(|| HlsError::ConfigMalformed {
                    path: path.clone(),
                    details: format!("entry '{}' is not a mapping", name),
                })?;
            updates.push((name.as_str(), settings));
        }

        let mut previous: Vec<(String, Settings)> = Vec::with_capacity(updates.len());
        for (name, settings) in updates {
            let Some(element) = self.elements.get_mut(name) else {
                continue;
            };
            let before = element.get_configuration();
            if let Err(source) = element.set_configuration(settings) {
                self.restore(previous);
                return Err(HlsError::ConfigRejected {
                    path: path.clone(),
                    source,
                });
            }
            previous.push((name.to_string(), before));
        }

        let applied: Vec<String> = previous.into_iter().map(|(name, _)| name).collect();
        tracing::info!(
            path = %path.display(),
            applied = applied.len(),
            ignored = ignored.len(),
            "Configuration loaded"
        );
        Ok(LoadOutcome::Loaded { applied, ignored })
    }

    fn restore(&mut self, snapshots: Vec<(String, Settings)>) {
        for (name, settings) in snapshots.into_iter().rev() {
            if let Some(element) = self.elements.get_mut(&name) {
                if let Err(err) = element.set_configuration(&settings) {
                    tracing::error!(element = %name, error = %err, "Failed to restore element snapshot");
                }
            }
        }
    }
}

/// Pretty-prints with four-space indentation.
fn to_indented_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(HlsError::ConfigSerialize)?;
    Ok(buf)
}
