//! # hls-core
//!
//! Control core for the hearing loss simulator: aggregates independently owned
//! settings into one persisted document and governs when the real-time worker
//! may be built, started and stopped.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. The worker runs on its own
//!   thread; everything else happens on the caller's control thread.
//! - **Not thread-safe**: One control surface drives one simulator.
//! - **Graceful degradation**: A missing or broken configuration file leaves
//!   defaults in place and is reported as a warning.
//! - **Strict lifecycle**: Illegal operations are rejected and leave state
//!   unchanged.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hls_core::{Simulator, StorageConfig};
//!
//! let mut simulator = Simulator::open(StorageConfig::from_environment()?, factory);
//! simulator.compute_filters()?;
//! if simulator.can_start() {
//!     simulator.start_stop_toggle(true)?;
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod params;
pub mod storage;
pub mod worker;

pub use config::elements::{
    AudioDeviceSelection, Calibration, GpuDeviceSelection, HearingLossParameter, AUDIO_DEVICE,
    CALIBRATION, GPU_DEVICE, HEARING_LOSS,
};
pub use config::{
    ConfigurationDocument, ConfigurationElement, ConfigurationStore, LoadOutcome, Settings,
};
pub use engine::Simulator;
pub use error::{ErrorKind, HlsError, Result, ValidationError};
pub use lifecycle::{LifecycleController, LifecycleState, Operation};
pub use params::{DeviceSelectors, FilterBankConstants, WorkerParameters};
pub use storage::{Platform, StorageConfig};
pub use worker::{ProcessFn, StopSignal, ThreadWorker, Worker, WorkerFactory};
