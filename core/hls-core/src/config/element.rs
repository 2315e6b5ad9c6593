//! The configuration element contract.
//!
//! An element owns one named subset of the settings. The store never looks
//! inside a snapshot; it only moves `Settings` maps between elements and the
//! persisted document.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Opaque per-element settings mapping.
pub type Settings = serde_json::Map<String, Value>;

/// A component owning one serializable settings subset.
pub trait ConfigurationElement: Send {
    /// Returns a serializable snapshot of the current state.
    fn get_configuration(&self) -> Settings;

    /// Applies a snapshot.
    ///
    /// Keys the element does not know are ignored and keys it knows but that
    /// are absent keep their current value. On error nothing is applied.
    fn set_configuration(&mut self, settings: &Settings) -> Result<(), ValidationError>;

    /// Whether edits to this element change the derived worker parameters.
    fn affects_worker(&self) -> bool {
        true
    }
}

/// Typed settings value backing an element.
pub trait SettingsSnapshot: Serialize + DeserializeOwned + Clone {
    /// Checks domain constraints serde cannot express.
    fn validate(&self, element: &str) -> Result<(), ValidationError>;
}

/// Serializes a typed snapshot into a settings map.
pub fn to_settings<T: Serialize>(value: &T) -> Settings {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::error!(value = %other, "Settings snapshot is not a mapping");
            Settings::new()
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize settings snapshot");
            Settings::new()
        }
    }
}

/// Overlays the known keys of `incoming` on `current` and validates the result.
///
/// Returns the merged snapshot without touching `current`, so callers commit
/// only after every key has been accepted.
pub fn merge_settings<T: SettingsSnapshot>(
    element: &str,
    current: &T,
    incoming: &Settings,
) -> Result<T, ValidationError> {
    let base = to_settings(current);
    let mut merged = base.clone();

    for (key, value) in incoming {
        if !base.contains_key(key) {
            tracing::debug!(element, key = %key, "Ignoring unknown settings key");
            continue;
        }

        let mut probe = base.clone();
        probe.insert(key.clone(), value.clone());
        if let Err(err) = serde_json::from_value::<T>(Value::Object(probe)) {
            return Err(ValidationError::new(element, key.as_str(), err.to_string()));
        }
        merged.insert(key.clone(), value.clone());
    }

    let candidate: T = serde_json::from_value(Value::Object(merged))
        .map_err(|err| ValidationError::new(element, "*", err.to_string()))?;
    candidate.validate(element)?;
    Ok(candidate)
}
