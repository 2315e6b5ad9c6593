//! Per-ear hearing loss curves.
//!
//! Each ear carries an audiogram: a list of `(freq, db_loss)` points sorted by
//! frequency. The worker interpolates between points when it builds its filter
//! bank, so the points need not line up with the worker's own bands.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::element::{
    merge_settings, to_settings, ConfigurationElement, Settings, SettingsSnapshot,
};
use crate::error::ValidationError;

pub const HEARING_LOSS: &str = "hearingloss";

/// Persisted key for the curves. Existing configuration files spell it this
/// way, so it is kept on disk as-is.
pub const LOSS_WEIGHT_KEY: &str = "loss_weigth";

/// Also accepted by `set_configuration`.
const LOSS_WEIGHT_ALIAS: &str = "loss_weight";

pub const MAX_EARS: usize = 2;
pub const MAX_FREQ_HZ: f64 = 24_000.0;
pub const MAX_LOSS_DB: f64 = 120.0;

const AUDIOGRAM_FREQS_HZ: [f64; 7] = [125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossPoint {
    pub freq: f64,
    pub db_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingLossSettings {
    /// One curve per ear, left first.
    #[serde(rename = "loss_weigth")]
    pub loss_weight: Vec<Vec<LossPoint>>,
}

impl Default for HearingLossSettings {
    fn default() -> Self {
        let flat: Vec<LossPoint> = AUDIOGRAM_FREQS_HZ
            .iter()
            .map(|&freq| LossPoint { freq, db_loss: 0.0 })
            .collect();
        Self {
            loss_weight: vec![flat; MAX_EARS],
        }
    }
}

impl SettingsSnapshot for HearingLossSettings {
    fn validate(&self, element: &str) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::new(element, LOSS_WEIGHT_KEY, reason);

        if self.loss_weight.is_empty() || self.loss_weight.len() > MAX_EARS {
            return Err(invalid(format!(
                "expected 1..={} curves, got {}",
                MAX_EARS,
                self.loss_weight.len()
            )));
        }

        for (ear, curve) in self.loss_weight.iter().enumerate() {
            if curve.is_empty() {
                return Err(invalid(format!("curve {} has no points", ear)));
            }
            for point in curve {
                if !point.freq.is_finite() || point.freq <= 0.0 || point.freq > MAX_FREQ_HZ {
                    return Err(invalid(format!(
                        "curve {}: frequency {} Hz outside (0, {}]",
                        ear, point.freq, MAX_FREQ_HZ
                    )));
                }
                if !point.db_loss.is_finite() || !(0.0..=MAX_LOSS_DB).contains(&point.db_loss) {
                    return Err(invalid(format!(
                        "curve {}: loss {} dB outside 0..={}",
                        ear, point.db_loss, MAX_LOSS_DB
                    )));
                }
            }
            if curve.windows(2).any(|pair| pair[1].freq <= pair[0].freq) {
                return Err(invalid(format!(
                    "curve {}: frequencies must be strictly increasing",
                    ear
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HearingLossParameter {
    settings: HearingLossSettings,
}

impl HearingLossParameter {
    pub fn settings(&self) -> &HearingLossSettings {
        &self.settings
    }

    /// Curves as `(freq, db_loss)` pairs, the shape the worker consumes.
    pub fn curves(&self) -> Vec<Vec<(f64, f64)>> {
        curves_of(&self.settings)
    }
}

pub(crate) fn curves_of(settings: &HearingLossSettings) -> Vec<Vec<(f64, f64)>> {
    settings
        .loss_weight
        .iter()
        .map(|curve| curve.iter().map(|p| (p.freq, p.db_loss)).collect())
        .collect()
}

impl ConfigurationElement for HearingLossParameter {
    fn get_configuration(&self) -> Settings {
        to_settings(&self.settings)
    }

    fn set_configuration(&mut self, settings: &Settings) -> Result<(), ValidationError> {
        let settings = with_persisted_key(settings);
        self.settings = merge_settings(HEARING_LOSS, &self.settings, &settings)?;
        Ok(())
    }
}

/// Rewrites `loss_weight` to the persisted spelling. When both are present
/// the persisted spelling wins.
fn with_persisted_key(settings: &Settings) -> Cow<'_, Settings> {
    match settings.get(LOSS_WEIGHT_ALIAS) {
        Some(curves) if !settings.contains_key(LOSS_WEIGHT_KEY) => {
            let mut renamed = settings.clone();
            renamed.remove(LOSS_WEIGHT_ALIAS);
            renamed.insert(LOSS_WEIGHT_KEY.to_string(), curves.clone());
            Cow::Owned(renamed)
        }
        _ => Cow::Borrowed(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: serde_json::Value) -> Settings {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_default_is_flat_two_ear_audiogram() {
        let element = HearingLossParameter::default();
        let curves = element.curves();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].len(), 7);
        assert!(curves.iter().flatten().all(|&(_, db)| db == 0.0));
    }

    #[test]
    fn test_accepts_single_ear_curve() {
        let mut element = HearingLossParameter::default();
        element
            .set_configuration(&settings(json!({
                "loss_weight": [[{"freq": 500.0, "db_loss": 10.0}, {"freq": 4000.0, "db_loss": 45.0}]]
            })))
            .unwrap();
        assert_eq!(element.curves(), vec![vec![(500.0, 10.0), (4000.0, 45.0)]]);
    }

    #[test]
    fn test_snapshot_uses_persisted_key() {
        let snapshot = HearingLossParameter::default().get_configuration();
        assert!(snapshot.contains_key("loss_weigth"));
        assert!(!snapshot.contains_key("loss_weight"));
    }

    #[test]
    fn test_accepts_both_key_spellings() {
        for key in ["loss_weigth", "loss_weight"] {
            let mut element = HearingLossParameter::default();
            let mut incoming = Settings::new();
            incoming.insert(key.to_string(), json!([[{"freq": 1000.0, "db_loss": 25.0}]]));
            element.set_configuration(&incoming).unwrap();
            assert_eq!(element.curves(), vec![vec![(1000.0, 25.0)]], "key {}", key);
        }
    }

    #[test]
    fn test_persisted_key_wins_over_alias() {
        let mut element = HearingLossParameter::default();
        element
            .set_configuration(&settings(json!({
                "loss_weigth": [[{"freq": 500.0, "db_loss": 10.0}]],
                "loss_weight": [[{"freq": 500.0, "db_loss": 90.0}]]
            })))
            .unwrap();
        assert_eq!(element.curves(), vec![vec![(500.0, 10.0)]]);
    }

    #[test]
    fn test_rejects_loss_above_maximum() {
        let mut element = HearingLossParameter::default();
        let err = element
            .set_configuration(&settings(json!({
                "loss_weight": [[{"freq": 1000.0, "db_loss": 150.0}]]
            })))
            .unwrap_err();
        assert_eq!(err.field, LOSS_WEIGHT_KEY);
        assert_eq!(element.settings(), &HearingLossSettings::default());
    }

    #[test]
    fn test_rejects_unsorted_frequencies() {
        let mut element = HearingLossParameter::default();
        let result = element.set_configuration(&settings(json!({
            "loss_weight": [[{"freq": 2000.0, "db_loss": 0.0}, {"freq": 1000.0, "db_loss": 0.0}]]
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_three_ears() {
        let point = json!({"freq": 1000.0, "db_loss": 0.0});
        let mut element = HearingLossParameter::default();
        let result = element.set_configuration(&settings(json!({
            "loss_weight": [[point.clone()], [point.clone()], [point]]
        })));
        assert!(result.is_err());
    }
}
