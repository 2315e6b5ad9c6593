//! Built-in configuration elements.
//!
//! Each element owns one entry of the persisted document, keyed by the name
//! constant exported next to it.

mod audio_device;
mod calibration;
mod gpu_device;
mod hearing_loss;

pub use audio_device::{AudioDeviceSelection, AudioDeviceSettings, AUDIO_DEVICE};
pub use calibration::{Calibration, CalibrationSettings, CALIBRATION};
pub use gpu_device::{GpuDeviceSelection, GpuDeviceSettings, GPU_DEVICE};
pub use hearing_loss::{
    HearingLossParameter, HearingLossSettings, LossPoint, HEARING_LOSS, LOSS_WEIGHT_KEY, MAX_EARS,
    MAX_FREQ_HZ, MAX_LOSS_DB,
};

pub(crate) use hearing_loss::curves_of;
