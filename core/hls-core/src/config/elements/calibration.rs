//! Sound pressure level calibration.

use serde::{Deserialize, Serialize};

use crate::config::element::{
    merge_settings, to_settings, ConfigurationElement, Settings, SettingsSnapshot,
};
use crate::error::ValidationError;

pub const CALIBRATION: &str = "calibration";

const DEFAULT_SPL_AT_ZERO_DBFS: f64 = 94.0;
const MAX_SPL: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// dB SPL produced by a full-scale (0 dBFS) sine at the output.
    pub spl_calibration_at_zero_dbfs: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            spl_calibration_at_zero_dbfs: DEFAULT_SPL_AT_ZERO_DBFS,
        }
    }
}

impl SettingsSnapshot for CalibrationSettings {
    fn validate(&self, element: &str) -> Result<(), ValidationError> {
        let spl = self.spl_calibration_at_zero_dbfs;
        if !spl.is_finite() || !(0.0..=MAX_SPL).contains(&spl) {
            return Err(ValidationError::new(
                element,
                "spl_calibration_at_zero_dbfs",
                format!("{} is outside 0..={} dB SPL", spl, MAX_SPL),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Calibration {
    settings: CalibrationSettings,
}

impl Calibration {
    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn spl_at_zero_dbfs(&self) -> f64 {
        self.settings.spl_calibration_at_zero_dbfs
    }
}

impl ConfigurationElement for Calibration {
    fn get_configuration(&self) -> Settings {
        to_settings(&self.settings)
    }

    fn set_configuration(&mut self, settings: &Settings) -> Result<(), ValidationError> {
        self.settings = merge_settings(CALIBRATION, &self.settings, settings)?;
        Ok(())
    }
}
