//! Simulator - the entry point for control surfaces.
//!
//! Ties the configuration store to the lifecycle controller:
//! - **Best-effort persistence**: the document is read on open and written on
//!   shutdown; failures become warnings instead of errors
//! - **Gated lifecycle**: every control call is checked against the
//!   lifecycle state and illegal calls are reported, not trusted away
//! - **Single-threaded**: callers drive it from one control thread
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use hls_core::{Simulator, StorageConfig};
//!
//! let mut simulator = Simulator::open(StorageConfig::from_environment()?, factory);
//! simulator.compute_filters()?;
//! simulator.start_stop_toggle(true)?;
//! // ...
//! for warning in simulator.shutdown() {
//!     eprintln!("warning: {warning}");
//! }
//! ```

use std::path::PathBuf;

use crate::config::{ConfigurationDocument, ConfigurationStore, Settings};
use crate::error::{HlsError, Result};
use crate::lifecycle::{LifecycleController, LifecycleState};
use crate::params::WorkerParameters;
use crate::storage::StorageConfig;
use crate::worker::WorkerFactory;

pub struct Simulator<F: WorkerFactory> {
    store: ConfigurationStore,
    controller: LifecycleController<F>,
    warnings: Vec<HlsError>,
}

impl<F: WorkerFactory> Simulator<F> {
    /// Opens a simulator with the built-in elements persisted under `storage`.
    pub fn open(storage: StorageConfig, factory: F) -> Self {
        Self::with_store(ConfigurationStore::with_builtin_elements(storage), factory)
    }

    /// Opens a simulator over a caller-assembled registry.
    pub fn with_store(mut store: ConfigurationStore, factory: F) -> Self {
        let mut warnings = Vec::new();
        if let Err(err) = store.load() {
            tracing::warn!(error = %err, "Could not load configuration; using defaults");
            warnings.push(err);
        }

        let mut controller = LifecycleController::new(factory);
        if let Err(err) = controller.initialize() {
            tracing::error!(error = %err, "Controller initialization rejected");
        }

        Self {
            store,
            controller,
            warnings,
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        self.store.storage()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration API
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn configuration(&self) -> ConfigurationDocument {
        self.store.document()
    }

    /// Applies a user edit to one element.
    ///
    /// Invalidates the built worker when the edit changed a value that feeds
    /// the worker parameters.
    pub fn edit(&mut self, name: &str, settings: &Settings) -> Result<()> {
        let before = self.store.snapshot(name)?;
        self.store.apply(name, settings)?;

        let changed = self.store.snapshot(name)? != before;
        let affects_worker = self
            .store
            .element(name)
            .is_some_and(|element| element.affects_worker());
        if changed && affects_worker {
            self.controller.on_settings_changed();
        }
        Ok(())
    }

    /// Writes the configuration now, outside the shutdown path.
    pub fn save(&self) -> Result<PathBuf> {
        self.store.save()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Control API
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn compute_filters(&mut self) -> Result<()> {
        self.controller.compute(&self.store)
    }

    pub fn start_stop_toggle(&mut self, enable: bool) -> Result<()> {
        self.controller.toggle(enable)
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    pub fn can_start(&self) -> bool {
        self.controller.can_start()
    }

    pub fn can_stop(&self) -> bool {
        self.controller.can_stop()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn parameters(&self) -> Option<&WorkerParameters> {
        self.controller.parameters()
    }

    /// Drains warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<HlsError> {
        std::mem::take(&mut self.warnings)
    }

    /// Stops a running worker, then saves the configuration.
    ///
    /// Returns every warning not yet taken, including a failed save.
    pub fn shutdown(mut self) -> Vec<HlsError> {
        if self.controller.can_stop() {
            if let Err(err) = self.controller.stop() {
                tracing::error!(error = %err, "Failed to stop worker during shutdown");
            }
        }

        if let Err(err) = self.store.save() {
            tracing::warn!(error = %err, "Could not save configuration");
            self.warnings.push(err);
        }

        self.take_warnings()
    }
}
