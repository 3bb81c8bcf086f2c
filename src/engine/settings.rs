//! Boil settings and stage definitions

use std::{fmt, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

const DEFAULT_TOTAL_MINUTES: u32 = 60;
const DEFAULT_VOLUME: f32 = 0.7;
const DEFAULT_PRE_ALERT_SECONDS: u32 = 30;
const DEFAULT_REPEAT_INTERVAL_MS: u64 = 2000;

/// Opaque stage identifier, stable across edits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sound played when a stage alert fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    #[default]
    Beep,
    Bell,
    Airhorn,
    Chirp,
}

impl SoundKind {
    /// How long one play of this sound lasts
    pub fn play_duration_ms(self) -> u64 {
        match self {
            SoundKind::Beep => 400,
            SoundKind::Bell => 1200,
            SoundKind::Airhorn => 1500,
            SoundKind::Chirp => 250,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoundKind::Beep => "beep",
            SoundKind::Bell => "bell",
            SoundKind::Airhorn => "airhorn",
            SoundKind::Chirp => "chirp",
        }
    }
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured stage as entered by the user
///
/// The threshold is kept raw here; [`StageCatalog`](super::catalog::StageCatalog)
/// rounds and clamps it before the scheduler sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub threshold_minutes: f64,
    #[serde(default)]
    pub sound: SoundKind,
}

impl Stage {
    pub fn new(id: impl Into<StageId>, label: impl Into<String>, threshold_minutes: f64, sound: SoundKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            threshold_minutes,
            sound,
        }
    }

    /// Apply a partial edit, keeping the identity
    pub fn apply(&mut self, patch: StagePatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(minutes) = patch.threshold_minutes {
            self.threshold_minutes = minutes;
        }
        if let Some(sound) = patch.sound {
            self.sound = sound;
        }
    }
}

/// A stage to be added; the id is assigned on insertion
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDraft {
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub threshold_minutes: f64,
    #[serde(default)]
    pub sound: SoundKind,
}

impl StageDraft {
    pub fn into_stage(self) -> Stage {
        Stage::new(StageId::generate(), self.label, self.threshold_minutes, self.sound)
    }
}

/// Partial stage edit
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePatch {
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_minutes")]
    pub threshold_minutes: Option<f64>,
    pub sound: Option<SoundKind>,
}

/// Process-wide configuration for a boil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(deserialize_with = "lenient_total_minutes")]
    pub total_minutes: u32,
    pub stages: Vec<Stage>,
    pub screen_flash: bool,
    pub vibration: bool,
    #[serde(deserialize_with = "lenient_volume")]
    pub volume: f32,
    #[serde(deserialize_with = "lenient_pre_alert_seconds")]
    pub pre_alert_seconds: u32,
    #[serde(deserialize_with = "lenient_repeat_interval_ms")]
    pub repeat_interval_ms: u64,
}

impl Settings {
    /// Recover out-of-range values instead of rejecting them
    pub fn sanitized(mut self) -> Self {
        self.total_minutes = self.total_minutes.max(1);
        self.volume = if self.volume.is_nan() {
            DEFAULT_VOLUME
        } else {
            self.volume.clamp(0.0, 1.0)
        };
        if self.repeat_interval_ms == 0 {
            self.repeat_interval_ms = DEFAULT_REPEAT_INTERVAL_MS;
        }
        self
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.total_minutes) * 60)
    }

    pub fn pre_alert_lead(&self) -> Duration {
        Duration::from_secs(u64::from(self.pre_alert_seconds))
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| &stage.id == id)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_minutes: DEFAULT_TOTAL_MINUTES,
            stages: vec![
                Stage::new("bittering", "Bittering hops", 0.0, SoundKind::Bell),
                Stage::new("flavor", "Flavor hops", 45.0, SoundKind::Beep),
                Stage::new("aroma", "Aroma hops", 55.0, SoundKind::Beep),
                Stage::new("flameout", "Flameout", 60.0, SoundKind::Airhorn),
            ],
            screen_flash: true,
            vibration: true,
            volume: DEFAULT_VOLUME,
            pre_alert_seconds: DEFAULT_PRE_ALERT_SECONDS,
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
        }
    }
}

/// Finite value of a JSON number or numeric string
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn coerce_minutes(value: &Value) -> f64 {
    coerce_number(value).unwrap_or(0.0)
}

/// Rounded and clamped to `0..=max`
fn coerce_whole(value: &Value, max: f64) -> Option<f64> {
    coerce_number(value).map(|number| number.round().clamp(0.0, max))
}

/// Accept numbers and numeric strings; anything else becomes minute 0
fn lenient_minutes<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_minutes(&value))
}

fn lenient_optional_minutes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|value| coerce_minutes(&value)))
}

fn lenient_total_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_whole(&value, f64::from(u32::MAX)).map_or(DEFAULT_TOTAL_MINUTES, |minutes| minutes as u32))
}

fn lenient_pre_alert_seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_whole(&value, f64::from(u32::MAX)).map_or(DEFAULT_PRE_ALERT_SECONDS, |seconds| seconds as u32))
}

fn lenient_repeat_interval_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_whole(&value, u64::MAX as f64).map_or(DEFAULT_REPEAT_INTERVAL_MS, |ms| ms as u64))
}

/// Range is left to [`Settings::sanitized`]
fn lenient_volume<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).map_or(DEFAULT_VOLUME, |volume| volume as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_parsed_leniently() {
        let json = r#"[
            {"id": "a", "label": "A", "thresholdMinutes": 12.4, "sound": "bell"},
            {"id": "b", "label": "B", "thresholdMinutes": "30"},
            {"id": "c", "label": "C", "thresholdMinutes": "soon"},
            {"id": "d", "label": "D", "thresholdMinutes": null}
        ]"#;
        let stages: Vec<Stage> = serde_json::from_str(json).unwrap();

        assert_eq!(stages[0].threshold_minutes, 12.4);
        assert_eq!(stages[0].sound, SoundKind::Bell);
        assert_eq!(stages[1].threshold_minutes, 30.0);
        assert_eq!(stages[1].sound, SoundKind::Beep);
        assert_eq!(stages[2].threshold_minutes, 0.0);
        assert_eq!(stages[3].threshold_minutes, 0.0);
    }

    #[test]
    fn non_finite_thresholds_become_zero() {
        let json = r#"[
            {"id": "a", "thresholdMinutes": "inf"},
            {"id": "b", "thresholdMinutes": "-Infinity"},
            {"id": "c", "thresholdMinutes": "NaN"}
        ]"#;
        let stages: Vec<Stage> = serde_json::from_str(json).unwrap();
        assert!(stages.iter().all(|stage| stage.threshold_minutes == 0.0));

        let patch: StagePatch = serde_json::from_str(r#"{"thresholdMinutes": "infinity"}"#).unwrap();
        assert_eq!(patch.threshold_minutes, Some(0.0));
    }

    #[test]
    fn numeric_settings_are_coerced() {
        let json = r#"{
            "totalMinutes": "90",
            "preAlertSeconds": 12.6,
            "volume": "0.4",
            "repeatIntervalMs": "1500"
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.total_minutes, 90);
        assert_eq!(settings.pre_alert_seconds, 13);
        assert_eq!(settings.volume, 0.4);
        assert_eq!(settings.repeat_interval_ms, 1500);
        assert_eq!(settings.stages.len(), 4);
    }

    #[test]
    fn bad_numeric_settings_recover_instead_of_failing() {
        let json = r#"{
            "totalMinutes": -20,
            "preAlertSeconds": -10,
            "volume": "loud",
            "repeatIntervalMs": -1,
            "stages": [{"id": "hop", "label": "Hops", "thresholdMinutes": 10}]
        }"#;
        let settings = serde_json::from_str::<Settings>(json).unwrap().sanitized();
        assert_eq!(settings.total_minutes, 1);
        assert_eq!(settings.pre_alert_seconds, 0);
        assert_eq!(settings.volume, 0.7);
        assert_eq!(settings.repeat_interval_ms, 2000);
        assert_eq!(settings.stages.len(), 1);

        let json = r#"{"totalMinutes": "long", "preAlertSeconds": null, "repeatIntervalMs": "often"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.total_minutes, 60);
        assert_eq!(settings.pre_alert_seconds, 30);
        assert_eq!(settings.repeat_interval_ms, 2000);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"totalMinutes": 90}"#).unwrap();
        assert_eq!(settings.total_minutes, 90);
        assert_eq!(settings.stages.len(), 4);
        assert_eq!(settings.repeat_interval_ms, 2000);
    }

    #[test]
    fn sanitize_recovers_out_of_range_values() {
        let settings = Settings {
            total_minutes: 0,
            volume: 3.5,
            repeat_interval_ms: 0,
            ..Settings::default()
        }
        .sanitized();

        assert_eq!(settings.total_minutes, 1);
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.repeat_interval_ms, 2000);

        let settings = Settings {
            volume: f32::NAN,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings.volume, 0.7);
    }

    #[test]
    fn patch_keeps_identity() {
        let mut stage = Stage::new("hop", "Hops", 10.0, SoundKind::Beep);
        stage.apply(StagePatch {
            threshold_minutes: Some(20.0),
            ..StagePatch::default()
        });
        assert_eq!(stage.id, StageId::from("hop"));
        assert_eq!(stage.label, "Hops");
        assert_eq!(stage.threshold_minutes, 20.0);
    }

    #[test]
    fn patch_threshold_accepts_strings() {
        let patch: StagePatch = serde_json::from_str(r#"{"thresholdMinutes": "15"}"#).unwrap();
        assert_eq!(patch.threshold_minutes, Some(15.0));

        let patch: StagePatch = serde_json::from_str(r#"{"label": "Whirlpool"}"#).unwrap();
        assert_eq!(patch.threshold_minutes, None);
    }

    #[test]
    fn drafts_get_fresh_ids() {
        let draft = StageDraft {
            label: "Dry hop".to_string(),
            threshold_minutes: 5.0,
            sound: SoundKind::Chirp,
        };
        let a = draft.clone().into_stage();
        let b = draft.into_stage();
        assert_ne!(a.id, b.id);
    }
}
