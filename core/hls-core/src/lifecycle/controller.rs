//! Owns the single worker handle and drives it through the lifecycle.

use crate::config::ConfigurationStore;
use crate::error::{HlsError, Result};
use crate::params::WorkerParameters;
use crate::worker::{Worker, WorkerFactory};

use super::state::{Lifecycle, LifecycleState, Operation};

pub struct LifecycleController<F: WorkerFactory> {
    factory: F,
    lifecycle: Lifecycle,
    worker: Option<F::Worker>,
    parameters: Option<WorkerParameters>,
}

impl<F: WorkerFactory> LifecycleController<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            lifecycle: Lifecycle::default(),
            worker: None,
            parameters: None,
        }
    }

    /// Marks start-up configuration as read.
    pub fn initialize(&mut self) -> Result<()> {
        self.lifecycle = self.checked(Operation::Initialize)?;
        Ok(())
    }

    /// Builds a fresh worker from the current element snapshots.
    ///
    /// The previous idle worker is dropped before the new one is built. If
    /// the build fails the controller falls back to `Ready` with no worker.
    pub fn compute(&mut self, store: &ConfigurationStore) -> Result<()> {
        let next = self.checked(Operation::Compute)?;
        let params = WorkerParameters::gather(store)?;

        if self.worker.take().is_some() {
            tracing::debug!("Discarded previous worker");
        }
        self.parameters = None;

        match self.factory.build(&params) {
            Ok(worker) => {
                self.worker = Some(worker);
                self.parameters = Some(params);
                self.lifecycle = next;
                tracing::info!(state = %self.lifecycle.state, "Worker built");
                Ok(())
            }
            Err(err) => {
                self.lifecycle = Lifecycle {
                    state: LifecycleState::Ready,
                    pending_invalidation: false,
                };
                tracing::warn!(error = %err, "Worker build failed");
                Err(err)
            }
        }
    }

    /// Records that a value feeding the worker parameters changed.
    pub fn on_settings_changed(&mut self) {
        let previous = self.lifecycle;
        // SettingsChanged is accepted in every state.
        if let Ok(next) = previous.apply(Operation::SettingsChanged) {
            self.lifecycle = next;
        }
        if previous != self.lifecycle {
            tracing::debug!(
                state = %self.lifecycle.state,
                pending_invalidation = self.lifecycle.pending_invalidation,
                "Settings changed"
            );
        }
    }

    /// Starts the built worker. Returns without waiting for processing.
    pub fn start(&mut self) -> Result<()> {
        let next = self.checked(Operation::Start)?;
        let worker = self.worker.as_mut().ok_or(HlsError::InvalidOperation {
            operation: Operation::Start,
            state: self.lifecycle.state,
        })?;

        worker.start()?;
        self.lifecycle = next;
        tracing::info!("Worker started");
        Ok(())
    }

    /// Stops the running worker and blocks until it has fully exited.
    ///
    /// There is no timeout: a worker that never exits blocks the caller.
    pub fn stop(&mut self) -> Result<()> {
        let next = self.checked(Operation::Stop)?;

        if let Some(worker) = self.worker.as_mut() {
            worker.stop();
            worker.wait();
        }
        self.lifecycle = next;
        tracing::info!(state = %self.lifecycle.state, "Worker stopped");
        Ok(())
    }

    /// Starts when `enable` is true, stops otherwise.
    pub fn toggle(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.start()
        } else {
            self.stop()
        }
    }

    fn checked(&self, operation: Operation) -> Result<Lifecycle> {
        self.lifecycle.apply(operation).map_err(|err| {
            tracing::warn!(%operation, state = %self.lifecycle.state, "Rejected lifecycle operation");
            err
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state
    }

    pub fn pending_invalidation(&self) -> bool {
        self.lifecycle.pending_invalidation
    }

    pub fn can_start(&self) -> bool {
        self.lifecycle.can_start()
    }

    pub fn can_stop(&self) -> bool {
        self.lifecycle.can_stop()
    }

    pub fn can_compute(&self) -> bool {
        self.lifecycle.can_compute()
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Asks the worker itself, not the lifecycle state.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| worker.is_running())
    }

    /// Parameters the current worker was built with.
    pub fn parameters(&self) -> Option<&WorkerParameters> {
        self.parameters.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::elements::CALIBRATION;
    use crate::error::ErrorKind;
    use crate::storage::StorageConfig;
    use crate::worker::test_utils::FakeFactory;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ConfigurationStore, LifecycleController<FakeFactory>) {
        let temp = TempDir::new().unwrap();
        let store =
            ConfigurationStore::with_builtin_elements(StorageConfig::with_root(temp.path().into()));
        let mut controller = LifecycleController::new(FakeFactory::default());
        controller.initialize().unwrap();
        (temp, store, controller)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Compute Tests
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_new_controller_is_uninitialized() {
        let controller = LifecycleController::new(FakeFactory::default());
        assert_eq!(controller.state(), LifecycleState::Uninitialized);
        assert!(!controller.has_worker());
    }

    #[test]
    fn test_compute_builds_worker() {
        let (_temp, store, mut controller) = setup();

        controller.compute(&store).unwrap();

        assert_eq!(controller.state(), LifecycleState::Built { can_start: true });
        assert!(controller.can_start());
        assert_eq!(controller.parameters().unwrap().calibration, 94.0);
    }

    #[test]
    fn test_recompute_replaces_worker() {
        let (_temp, store, mut controller) = setup();

        controller.compute(&store).unwrap();
        controller.compute(&store).unwrap();

        assert_eq!(controller.factory.log.built(), 2);
        assert_eq!(controller.factory.log.dropped(), 1);
        assert!(controller.can_start());
    }

    #[test]
    fn test_compute_while_running_is_rejected_without_effect() {
        let (_temp, store, mut controller) = setup();
        controller.compute(&store).unwrap();
        controller.start().unwrap();

        let err = controller.compute(&store).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(controller.state(), LifecycleState::Running);
        assert_eq!(controller.factory.log.built(), 1);
        assert!(controller.is_running());
    }

    #[test]
    fn test_failed_build_leaves_no_worker() {
        let (_temp, store, mut controller) = setup();
        controller.compute(&store).unwrap();
        controller.factory.fail_builds.store(true, Ordering::SeqCst);

        let err = controller.compute(&store).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Worker);
        assert_eq!(controller.state(), LifecycleState::Ready);
        assert!(!controller.has_worker());
        assert!(controller.parameters().is_none());
    }

    #[test]
    fn test_compute_uses_latest_settings() {
        let (_temp, mut store, mut controller) = setup();
        store
            .apply(
                CALIBRATION,
                json!({"spl_calibration_at_zero_dbfs": 101.5}).as_object().unwrap(),
            )
            .unwrap();

        controller.compute(&store).unwrap();

        assert_eq!(controller.parameters().unwrap().calibration, 101.5);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Start / Stop Tests
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_start_without_build_rejected() {
        let (_temp, _store, mut controller) = setup();

        let err = controller.start().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(controller.state(), LifecycleState::Ready);
    }

    #[test]
    fn test_stop_when_not_running_rejected() {
        let (_temp, store, mut controller) = setup();
        assert!(controller.stop().is_err());

        controller.compute(&store).unwrap();
        assert!(controller.stop().is_err());
        assert_eq!(controller.factory.log.waited(), 0);
    }

    #[test]
    fn test_start_stop_cycle_reuses_worker() {
        let (_temp, store, mut controller) = setup();
        controller.compute(&store).unwrap();

        for _ in 0..3 {
            controller.toggle(true).unwrap();
            assert!(controller.is_running());
            assert!(controller.can_stop());

            controller.toggle(false).unwrap();
            assert!(!controller.is_running());
            assert!(controller.can_start());
        }

        assert_eq!(controller.factory.log.built(), 1);
        assert_eq!(controller.factory.log.started(), 3);
        assert_eq!(controller.factory.log.waited(), 3);
    }

    #[test]
    fn test_failed_start_keeps_startable_build() {
        let (_temp, store, mut controller) = setup();
        controller.compute(&store).unwrap();
        controller.factory.fail_starts.store(true, Ordering::SeqCst);

        let err = controller.start().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Worker);
        assert_eq!(controller.state(), LifecycleState::Built { can_start: true });
        assert!(!controller.is_running());
        assert!(controller.has_worker());
        assert_eq!(controller.factory.log.started(), 0);

        controller.factory.fail_starts.store(false, Ordering::SeqCst);
        controller.start().unwrap();
        assert_eq!(controller.state(), LifecycleState::Running);
        assert_eq!(controller.factory.log.built(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Invalidation Tests
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_change_blocks_start_until_recompute() {
        let (_temp, store, mut controller) = setup();
        controller.compute(&store).unwrap();

        controller.on_settings_changed();

        assert!(!controller.can_start());
        assert!(controller.start().is_err());

        controller.compute(&store).unwrap();
        assert!(controller.can_start());
    }

    #[test]
    fn test_settings_change_while_running_applies_after_stop() {
        let (_temp, store, mut controller) = setup();
        controller.compute(&store).unwrap();
        controller.start().unwrap();

        controller.on_settings_changed();
        assert!(controller.pending_invalidation());
        assert!(controller.is_running());

        controller.stop().unwrap();

        assert_eq!(controller.state(), LifecycleState::Built { can_start: false });
        assert!(!controller.pending_invalidation());
        assert!(!controller.can_start());
    }
}
