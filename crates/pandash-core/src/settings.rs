//! Backend settings model, the editable form and local validation.
//!
//! The settings object is fetched whole, edited, validated locally and PUT
//! back whole. Validation is pure: it returns every violation at once so the
//! caller can show them in a single aggregated message.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Full settings object as exchanged with `/api/control/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Throttle parameters for the backend workers
    pub throttle: ThrottleSettings,
    /// Worker pool sizes
    pub workers: WorkerSettings,
    /// Global rate limiting switch
    pub rate_limit: RateLimitSettings,
    /// Client-facing preferences
    pub ui: UiPreferences,
}

/// Throttle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
    /// Minimum delay between operations (ms)
    pub jitter_ms_min: i64,
    /// Maximum delay between operations (ms)
    pub jitter_ms_max: i64,
    /// Operations allowed per window
    pub ops_per_window: i64,
    /// Window length (s)
    pub window_sec: i64,
    /// Rest after a full window (s)
    pub window_rest_sec: i64,
    /// Failures in a row before pausing
    pub max_consecutive_failures: i64,
    /// Pause after hitting the failure cap (s)
    pub pause_sec_on_failure: i64,
    /// Backoff multiplier; not editable from the form
    pub backoff_factor: f64,
    /// Cooldown after the backend reports errno -62 (s)
    #[serde(rename = "cooldown_on_errno_-62_sec")]
    pub cooldown_on_errno_62_sec: i64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            jitter_ms_min: 500,
            jitter_ms_max: 1500,
            ops_per_window: 50,
            window_sec: 60,
            window_rest_sec: 20,
            max_consecutive_failures: 5,
            pause_sec_on_failure: 60,
            backoff_factor: 1.5,
            cooldown_on_errno_62_sec: 120,
        }
    }
}

/// Worker pool sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Concurrent transfer workers
    pub max_transfer_workers: i64,
    /// Concurrent share workers
    pub max_share_workers: i64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_transfer_workers: 1,
            max_share_workers: 1,
        }
    }
}

/// Rate limiting switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Whether the backend applies the throttle
    pub enabled: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Client-facing preferences, also the `settingsUpdated` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Queue auto-refresh interval (ms)
    pub auto_refresh_interval: i64,
    /// Whether the API key is persisted between sessions
    pub api_key_retention: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            auto_refresh_interval: 5000,
            api_key_retention: true,
        }
    }
}

impl UiPreferences {
    /// The refresh interval as a duration, if it is positive.
    pub fn refresh_period(&self) -> Option<std::time::Duration> {
        u64::try_from(self.auto_refresh_interval)
            .ok()
            .filter(|ms| *ms > 0)
            .map(std::time::Duration::from_millis)
    }
}

fn check_range(errors: &mut Vec<String>, name: &str, value: i64, min: i64, max: i64, unit: &str) {
    if value < min || value > max {
        errors.push(format!("{name} must be between {min} and {max}{unit}"));
    }
}

/// Validate a settings object, returning every violation.
///
/// An empty vector means the object may be saved.
pub fn validate(settings: &Settings) -> Vec<String> {
    let mut errors = Vec::new();
    let t = &settings.throttle;

    check_range(&mut errors, "jitter_ms_min", t.jitter_ms_min, 0, 10_000, " ms");
    if t.jitter_ms_max < t.jitter_ms_min || t.jitter_ms_max > 10_000 {
        errors.push("jitter_ms_max must be between jitter_ms_min and 10000 ms".to_string());
    }
    check_range(&mut errors, "ops_per_window", t.ops_per_window, 1, 1000, "");
    check_range(&mut errors, "window_sec", t.window_sec, 1, 3600, " s");
    check_range(&mut errors, "window_rest_sec", t.window_rest_sec, 0, 600, " s");
    check_range(
        &mut errors,
        "max_consecutive_failures",
        t.max_consecutive_failures,
        1,
        100,
        "",
    );
    check_range(&mut errors, "pause_sec_on_failure", t.pause_sec_on_failure, 0, 3600, " s");
    check_range(
        &mut errors,
        "cooldown_on_errno_-62_sec",
        t.cooldown_on_errno_62_sec,
        0,
        3600,
        " s",
    );
    if !(1.0..=5.0).contains(&t.backoff_factor) {
        errors.push("backoff_factor must be between 1.0 and 5.0".to_string());
    }

    let w = &settings.workers;
    check_range(&mut errors, "max_transfer_workers", w.max_transfer_workers, 1, 10, "");
    check_range(&mut errors, "max_share_workers", w.max_share_workers, 1, 10, "");

    check_range(
        &mut errors,
        "auto_refresh_interval",
        settings.ui.auto_refresh_interval,
        1000,
        60_000,
        " ms",
    );

    errors
}

/// Validate and turn violations into [`Error::Validation`].
pub fn ensure_valid(settings: &Settings) -> Result<()> {
    let errors = validate(settings);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// A numeric field of the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// `throttle.jitter_ms_min`
    JitterMin,
    /// `throttle.jitter_ms_max`
    JitterMax,
    /// `throttle.ops_per_window`
    OpsPerWindow,
    /// `throttle.window_sec`
    WindowSec,
    /// `throttle.window_rest_sec`
    WindowRestSec,
    /// `throttle.max_consecutive_failures`
    MaxFailures,
    /// `throttle.pause_sec_on_failure`
    PauseOnFailure,
    /// `throttle.cooldown_on_errno_-62_sec`
    Cooldown,
    /// `workers.max_transfer_workers`
    TransferWorkers,
    /// `workers.max_share_workers`
    ShareWorkers,
    /// `ui.auto_refresh_interval`
    RefreshInterval,
}

impl FormField {
    /// All numeric fields in form order.
    pub const fn all() -> &'static [Self] {
        &[
            Self::JitterMin,
            Self::JitterMax,
            Self::OpsPerWindow,
            Self::WindowSec,
            Self::WindowRestSec,
            Self::MaxFailures,
            Self::PauseOnFailure,
            Self::Cooldown,
            Self::TransferWorkers,
            Self::ShareWorkers,
            Self::RefreshInterval,
        ]
    }

    /// Wire name of the field.
    pub const fn key(self) -> &'static str {
        match self {
            Self::JitterMin => "jitter_ms_min",
            Self::JitterMax => "jitter_ms_max",
            Self::OpsPerWindow => "ops_per_window",
            Self::WindowSec => "window_sec",
            Self::WindowRestSec => "window_rest_sec",
            Self::MaxFailures => "max_consecutive_failures",
            Self::PauseOnFailure => "pause_sec_on_failure",
            Self::Cooldown => "cooldown_on_errno_-62_sec",
            Self::TransferWorkers => "max_transfer_workers",
            Self::ShareWorkers => "max_share_workers",
            Self::RefreshInterval => "auto_refresh_interval",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::JitterMin => "Min delay (ms)",
            Self::JitterMax => "Max delay (ms)",
            Self::OpsPerWindow => "Ops per window",
            Self::WindowSec => "Window (s)",
            Self::WindowRestSec => "Window rest (s)",
            Self::MaxFailures => "Max consecutive failures",
            Self::PauseOnFailure => "Pause on failure (s)",
            Self::Cooldown => "Cooldown on -62 (s)",
            Self::TransferWorkers => "Transfer workers",
            Self::ShareWorkers => "Share workers",
            Self::RefreshInterval => "Auto refresh (ms)",
        }
    }

    const fn read(self, s: &Settings) -> i64 {
        match self {
            Self::JitterMin => s.throttle.jitter_ms_min,
            Self::JitterMax => s.throttle.jitter_ms_max,
            Self::OpsPerWindow => s.throttle.ops_per_window,
            Self::WindowSec => s.throttle.window_sec,
            Self::WindowRestSec => s.throttle.window_rest_sec,
            Self::MaxFailures => s.throttle.max_consecutive_failures,
            Self::PauseOnFailure => s.throttle.pause_sec_on_failure,
            Self::Cooldown => s.throttle.cooldown_on_errno_62_sec,
            Self::TransferWorkers => s.workers.max_transfer_workers,
            Self::ShareWorkers => s.workers.max_share_workers,
            Self::RefreshInterval => s.ui.auto_refresh_interval,
        }
    }

    fn write(self, s: &mut Settings, value: i64) {
        let slot = match self {
            Self::JitterMin => &mut s.throttle.jitter_ms_min,
            Self::JitterMax => &mut s.throttle.jitter_ms_max,
            Self::OpsPerWindow => &mut s.throttle.ops_per_window,
            Self::WindowSec => &mut s.throttle.window_sec,
            Self::WindowRestSec => &mut s.throttle.window_rest_sec,
            Self::MaxFailures => &mut s.throttle.max_consecutive_failures,
            Self::PauseOnFailure => &mut s.throttle.pause_sec_on_failure,
            Self::Cooldown => &mut s.throttle.cooldown_on_errno_62_sec,
            Self::TransferWorkers => &mut s.workers.max_transfer_workers,
            Self::ShareWorkers => &mut s.workers.max_share_workers,
            Self::RefreshInterval => &mut s.ui.auto_refresh_interval,
        };
        *slot = value;
    }
}

/// Editable text form over a [`Settings`] object.
///
/// Numeric inputs are kept as raw text so a half-typed value can be shown
/// and reported instead of silently coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    values: Vec<String>,
    /// `rate_limit.enabled`
    pub rate_limit_enabled: bool,
    /// `ui.api_key_retention`
    pub api_key_retention: bool,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SettingsForm {
    /// Populate the form from a settings object.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            values: FormField::all()
                .iter()
                .map(|f| f.read(settings).to_string())
                .collect(),
            rate_limit_enabled: settings.rate_limit.enabled,
            api_key_retention: settings.ui.api_key_retention,
        }
    }

    /// Raw text of a field.
    pub fn value(&self, field: FormField) -> &str {
        FormField::all()
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.values.get(i))
            .map_or("", String::as_str)
    }

    /// Replace the raw text of a field.
    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        if let Some(i) = FormField::all().iter().position(|f| *f == field) {
            if let Some(slot) = self.values.get_mut(i) {
                *slot = value.into();
            }
        }
    }

    /// Build a settings object from the form.
    ///
    /// `backoff_factor` is not part of the form and is carried over from
    /// `current` (1.5 when nothing has been loaded yet). Fails with every
    /// unparseable field and every range violation.
    pub fn collect(&self, current: Option<&Settings>) -> Result<Settings> {
        let mut settings = current.cloned().unwrap_or_default();
        settings.throttle.backoff_factor = current.map_or(1.5, |c| c.throttle.backoff_factor);
        settings.rate_limit.enabled = self.rate_limit_enabled;
        settings.ui.api_key_retention = self.api_key_retention;

        let mut errors = Vec::new();
        for field in FormField::all() {
            match self.value(*field).trim().parse::<i64>() {
                Ok(v) => field.write(&mut settings, v),
                Err(_) => errors.push(format!("{} must be a whole number", field.key())),
            }
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        ensure_valid(&settings)?;
        Ok(settings)
    }
}
