//! Worker parameters derived from the registered elements at compute time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::elements::{
    curves_of, AudioDeviceSettings, CalibrationSettings, GpuDeviceSettings, HearingLossSettings,
    AUDIO_DEVICE, CALIBRATION, GPU_DEVICE, HEARING_LOSS,
};
use crate::config::ConfigurationStore;
use crate::error::{HlsError, Result};

/// Fixed numeric set the filter bank is built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterBankConstants {
    /// Number of bands.
    pub nfreq: usize,
    /// Hz.
    pub low_freq: f64,
    /// Hz.
    pub high_freq: f64,
    /// Level estimation decay, seconds.
    pub tau_level: f64,
    /// Gain smoothing, seconds.
    pub smooth_time: f64,
    /// dB.
    pub level_step: f64,
    /// dB.
    pub level_max: f64,
}

impl Default for FilterBankConstants {
    fn default() -> Self {
        Self {
            nfreq: 32,
            low_freq: 80.0,
            high_freq: 15_000.0,
            tau_level: 0.005,
            smooth_time: 0.0005,
            level_step: 0.1,
            level_max: 120.0,
        }
    }
}

/// Device selectors the worker opens its streams and GPU context on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelectors {
    pub input_device: Option<u32>,
    pub output_device: Option<u32>,
    pub gpu_platform: u32,
    pub gpu_device: u32,
}

/// Everything a worker needs to build its processing chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerParameters {
    pub devices: DeviceSelectors,
    /// `(freq, db_loss)` points per ear.
    pub loss_weight: Vec<Vec<(f64, f64)>>,
    /// dB SPL at 0 dBFS.
    pub calibration: f64,
    pub filter_bank: FilterBankConstants,
}

impl WorkerParameters {
    /// Reads the current snapshots of the built-in elements.
    pub fn gather(store: &ConfigurationStore) -> Result<Self> {
        let hearing_loss: HearingLossSettings = typed_snapshot(store, HEARING_LOSS)?;
        let calibration: CalibrationSettings = typed_snapshot(store, CALIBRATION)?;
        let audio: AudioDeviceSettings = typed_snapshot(store, AUDIO_DEVICE)?;
        let gpu: GpuDeviceSettings = typed_snapshot(store, GPU_DEVICE)?;

        Ok(Self {
            devices: DeviceSelectors {
                input_device: audio.input_device,
                output_device: audio.output_device,
                gpu_platform: gpu.platform_index,
                gpu_device: gpu.device_index,
            },
            loss_weight: curves_of(&hearing_loss),
            calibration: calibration.spl_calibration_at_zero_dbfs,
            filter_bank: FilterBankConstants::default(),
        })
    }
}

fn typed_snapshot<T: DeserializeOwned>(store: &ConfigurationStore, name: &str) -> Result<T> {
    let settings = store.snapshot(name)?;
    serde_json::from_value(serde_json::Value::Object(settings)).map_err(|e| HlsError::Parameters {
        element: name.to_string(),
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::StorageConfig;
    use serde_json::json;
    use std::path::PathBuf;

    fn store() -> ConfigurationStore {
        ConfigurationStore::with_builtin_elements(StorageConfig::with_root(PathBuf::from(
            "/nonexistent/hls",
        )))
    }

    #[test]
    fn test_gather_defaults() {
        let params = WorkerParameters::gather(&store()).unwrap();
        assert_eq!(params.calibration, 94.0);
        assert_eq!(params.devices, DeviceSelectors::default());
        assert_eq!(params.loss_weight.len(), 2);
        assert_eq!(params.filter_bank.nfreq, 32);
        assert_eq!(params.filter_bank.high_freq, 15_000.0);
    }

    #[test]
    fn test_gather_reflects_edits() {
        let mut store = store();
        store
            .apply(
                AUDIO_DEVICE,
                json!({"input_device": 2, "output_device": 5}).as_object().unwrap(),
            )
            .unwrap();
        store
            .apply(
                GPU_DEVICE,
                json!({"platform_index": 1}).as_object().unwrap(),
            )
            .unwrap();

        let params = WorkerParameters::gather(&store).unwrap();

        assert_eq!(
            params.devices,
            DeviceSelectors {
                input_device: Some(2),
                output_device: Some(5),
                gpu_platform: 1,
                gpu_device: 0,
            }
        );
    }

    #[test]
    fn test_gather_requires_builtin_elements() {
        let empty = ConfigurationStore::new(StorageConfig::with_root(PathBuf::from("/tmp/hls")));
        let err = WorkerParameters::gather(&empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registry);
    }
}
