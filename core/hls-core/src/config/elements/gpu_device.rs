//! OpenCL platform and device selection.

use serde::{Deserialize, Serialize};

use crate::config::element::{
    merge_settings, to_settings, ConfigurationElement, Settings, SettingsSnapshot,
};
use crate::error::ValidationError;

pub const GPU_DEVICE: &str = "gpudevice";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuDeviceSettings {
    pub platform_index: u32,
    pub device_index: u32,
}

impl SettingsSnapshot for GpuDeviceSettings {
    // Indices are range-checked by the worker against the platforms present at build time.
    fn validate(&self, _element: &str) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GpuDeviceSelection {
    settings: GpuDeviceSettings,
}

impl GpuDeviceSelection {
    pub fn settings(&self) -> &GpuDeviceSettings {
        &self.settings
    }
}

impl ConfigurationElement for GpuDeviceSelection {
    fn get_configuration(&self) -> Settings {
        to_settings(&self.settings)
    }

    fn set_configuration(&mut self, settings: &Settings) -> Result<(), ValidationError> {
        self.settings = merge_settings(GPU_DEVICE, &self.settings, settings)?;
        Ok(())
    }
}
