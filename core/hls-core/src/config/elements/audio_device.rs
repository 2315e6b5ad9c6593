//! Audio input and output device selection.

use serde::{Deserialize, Serialize};

use crate::config::element::{
    merge_settings, to_settings, ConfigurationElement, Settings, SettingsSnapshot,
};
use crate::error::ValidationError;

pub const AUDIO_DEVICE: &str = "audiodevice";

/// Device indices as enumerated by the audio host; `None` selects the system default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDeviceSettings {
    pub input_device: Option<u32>,
    pub output_device: Option<u32>,
}

impl SettingsSnapshot for AudioDeviceSettings {
    fn validate(&self, _element: &str) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AudioDeviceSelection {
    settings: AudioDeviceSettings,
}

impl AudioDeviceSelection {
    pub fn settings(&self) -> &AudioDeviceSettings {
        &self.settings
    }
}

impl ConfigurationElement for AudioDeviceSelection {
    fn get_configuration(&self) -> Settings {
        to_settings(&self.settings)
    }

    fn set_configuration(&mut self, settings: &Settings) -> Result<(), ValidationError> {
        self.settings = merge_settings(AUDIO_DEVICE, &self.settings, settings)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_selects_system_default() {
        let mut element = AudioDeviceSelection::default();
        let input = json!({"input_device": 3, "output_device": null});
        element.set_configuration(input.as_object().unwrap()).unwrap();
        assert_eq!(element.settings().input_device, Some(3));
        assert_eq!(element.settings().output_device, None);
    }

    #[test]
    fn test_snapshot_keeps_null_keys() {
        let snapshot = AudioDeviceSelection::default().get_configuration();
        assert!(snapshot.contains_key("input_device"));
        assert!(snapshot.contains_key("output_device"));
    }
}
