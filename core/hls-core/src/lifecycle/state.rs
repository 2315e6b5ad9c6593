//! Pure lifecycle transitions.
//! Every operation either yields the next state or is rejected without effect.

use std::fmt;

use crate::error::{HlsError, Result};

/// Which operations are currently legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Before the persisted configuration has been read.
    #[default]
    Uninitialized,
    /// Configuration loaded, no worker built yet.
    Ready,
    /// A worker exists and is idle. `can_start` is false once a settings
    /// change has made it stale.
    Built { can_start: bool },
    Running,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Built { can_start: true } => write!(f, "built"),
            LifecycleState::Built { can_start: false } => write!(f, "built with stale settings"),
            LifecycleState::Running => write!(f, "running"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Compute,
    SettingsChanged,
    Start,
    Stop,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Initialize => write!(f, "initialize"),
            Operation::Compute => write!(f, "compute"),
            Operation::SettingsChanged => write!(f, "apply settings change"),
            Operation::Start => write!(f, "start"),
            Operation::Stop => write!(f, "stop"),
        }
    }
}

/// Lifecycle state plus the invalidation deferred while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    pub state: LifecycleState,
    /// Settings changed during the current run; applied by the next stop.
    pub pending_invalidation: bool,
}

impl Lifecycle {
    pub fn apply(self, operation: Operation) -> Result<Lifecycle> {
        use LifecycleState::*;

        let reject = || HlsError::InvalidOperation {
            operation,
            state: self.state,
        };

        let next = match (operation, self.state) {
            (Operation::Initialize, Uninitialized) => Lifecycle {
                state: Ready,
                pending_invalidation: false,
            },
            (Operation::Initialize, _) => return Err(reject()),

            (Operation::Compute, Running) => return Err(reject()),
            (Operation::Compute, _) => Lifecycle {
                state: Built { can_start: true },
                pending_invalidation: false,
            },

            (Operation::SettingsChanged, Built { .. }) => Lifecycle {
                state: Built { can_start: false },
                ..self
            },
            (Operation::SettingsChanged, Running) => Lifecycle {
                pending_invalidation: true,
                ..self
            },
            (Operation::SettingsChanged, Uninitialized | Ready) => self,

            (Operation::Start, Built { can_start: true }) => Lifecycle {
                state: Running,
                pending_invalidation: false,
            },
            (Operation::Start, _) => return Err(reject()),

            (Operation::Stop, Running) => Lifecycle {
                state: Built {
                    can_start: !self.pending_invalidation,
                },
                pending_invalidation: false,
            },
            (Operation::Stop, _) => return Err(reject()),
        };

        Ok(next)
    }

    pub fn can_start(&self) -> bool {
        self.state == LifecycleState::Built { can_start: true }
    }

    pub fn can_stop(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn can_compute(&self) -> bool {
        self.state != LifecycleState::Running
    }
}
