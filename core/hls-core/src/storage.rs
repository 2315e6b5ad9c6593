//! Storage configuration and path management.
//!
//! `StorageConfig` decides where the persisted configuration document lives.
//! Platform conventions are resolved once, up front, and the resulting value
//! is injected into the store so the rest of the crate never branches on the
//! operating system.
//!
//! | Platform | Directory                                      |
//! |----------|------------------------------------------------|
//! | Windows  | `%APPDATA%\HearingLossSimulator`               |
//! | Others   | `~/.config/HearingLossSimulator`               |

use std::path::{Path, PathBuf};

use crate::error::{HlsError, Result};

/// Application subdirectory shared by every platform.
pub const APP_DIR_NAME: &str = "HearingLossSimulator";

/// Fixed name of the persisted configuration document.
pub const CONFIG_FILE_NAME: &str = "configuration.json";

/// Path convention used to locate the per-user application directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Roaming application-data profile directory.
    Windows,
    /// Dotfile configuration directory under the home directory.
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Location of the persisted configuration.
///
/// Production code uses [`StorageConfig::from_environment`].
/// Tests use [`StorageConfig::with_root`] with a temp directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Per-user application directory, created on first save.
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the application directory for the running platform.
    pub fn from_environment() -> Result<Self> {
        let platform = Platform::current();
        let base = match platform {
            Platform::Windows => dirs::config_dir(),
            Platform::Posix => dirs::home_dir(),
        }
        .ok_or_else(|| {
            HlsError::ConfigDirNotFound(format!("no base directory for {:?}", platform))
        })?;
        Ok(Self::for_platform(platform, &base))
    }

    /// Builds the location from an explicit platform and base directory.
    ///
    /// `base` is the roaming application-data directory on Windows and the
    /// home directory elsewhere.
    pub fn for_platform(platform: Platform, base: &Path) -> Self {
        let root = match platform {
            Platform::Windows => base.join(APP_DIR_NAME),
            Platform::Posix => base.join(".config").join(APP_DIR_NAME),
        };
        Self { root }
    }

    /// Uses `root` directly as the application directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to configuration.json.
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Creates the application directory if it is missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs_err::create_dir_all(&self.root)
    }
}
