//! The worker boundary.
//!
//! The real-time audio/GPU pipeline lives outside this crate. The controller
//! only ever sees it through [`Worker`], built by a [`WorkerFactory`] from the
//! parameters gathered at compute time.
//!
//! [`ThreadWorker`] is a ready-made implementation that runs a processing
//! closure on a dedicated thread until asked to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{HlsError, Result};
use crate::params::WorkerParameters;

/// Long-lived processing unit driven by the lifecycle controller.
///
/// Implementors must keep `start`, `stop` and `is_running` non-blocking. A
/// worker may be started again once `wait` has returned.
pub trait Worker: Send {
    /// Begins processing. Callers never start a running worker.
    fn start(&mut self) -> Result<()>;

    /// Signals shutdown. Called at most once per run.
    fn stop(&mut self);

    /// Blocks until processing has fully exited and its resources are released.
    fn wait(&mut self);

    /// Must report false once `wait` has returned.
    fn is_running(&self) -> bool;
}

/// Constructs workers bound to a parameter set.
pub trait WorkerFactory {
    type Worker: Worker;

    fn build(&self, params: &WorkerParameters) -> Result<Self::Worker>;
}

impl<F, W> WorkerFactory for F
where
    F: Fn(&WorkerParameters) -> Result<W>,
    W: Worker,
{
    type Worker = W;

    fn build(&self, params: &WorkerParameters) -> Result<W> {
        self(params)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Thread-backed Worker
// ═══════════════════════════════════════════════════════════════════════════════

/// Shutdown flag handed to a [`ThreadWorker`] body.
#[derive(Debug, Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Processing loop run on the worker thread. Returns when the signal trips.
pub type ProcessFn = dyn Fn(&WorkerParameters, &StopSignal) + Send + Sync;

pub struct ThreadWorker {
    params: Arc<WorkerParameters>,
    body: Arc<ProcessFn>,
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl ThreadWorker {
    pub fn new(params: WorkerParameters, body: Arc<ProcessFn>) -> Self {
        Self {
            params: Arc::new(params),
            body,
            stop: StopSignal(Arc::new(AtomicBool::new(false))),
            handle: None,
        }
    }

    pub fn params(&self) -> &WorkerParameters {
        &self.params
    }
}

impl Worker for ThreadWorker {
    fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            tracing::warn!("Worker thread already started; ignoring start");
            return Ok(());
        }

        self.stop.0.store(false, Ordering::Release);
        let params = Arc::clone(&self.params);
        let body = Arc::clone(&self.body);
        let stop = self.stop.clone();

        let handle = thread::Builder::new()
            .name("hls-worker".to_string())
            .spawn(move || body(&params, &stop))
            .map_err(|e| HlsError::WorkerStart(e.to_string()))?;
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop.0.store(true, Ordering::Release);
    }

    fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Dropping a started worker signals it and blocks until the thread exits.
impl Drop for ThreadWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
            self.wait();
        }
    }
}
