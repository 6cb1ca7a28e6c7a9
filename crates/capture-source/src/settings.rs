use core::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GrabMode, target::FALLBACK_SIZE, throttle::DEFAULT_FPS};

/// The time between grab count reports when the settings don't give a usable one.
const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Settings a capture source is created with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// The frame rate used when the host doesn't report one.
    pub fallback_fps: f64,

    /// The capture size used when no primary display is found.
    pub fallback_size: [u32; 2],

    /// Composite the hardware cursor into the capture.
    pub with_cursor: bool,

    /// Seconds between grab count reports.
    pub report_interval_secs: f64,

    /// Scale the desktop to the capture size, otherwise grab at the desktop's own size.
    pub scale_to_target: bool,
}

impl CaptureSettings {
    /// Parse settings from TOML, missing keys take their default value.
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize the settings to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.fallback_fps.is_finite() && self.fallback_fps > 0.0) {
            return Err(SettingsError::FallbackFps(self.fallback_fps));
        }

        if !(self.report_interval_secs > 0.0
            && Duration::try_from_secs_f64(self.report_interval_secs).is_ok())
        {
            return Err(SettingsError::ReportInterval(self.report_interval_secs));
        }

        if self.fallback_size[0] == 0 || self.fallback_size[1] == 0 {
            return Err(SettingsError::FallbackSize(self.fallback_size));
        }

        Ok(())
    }

    /// The time between grab count reports, one second if the value isn't a valid duration.
    pub fn report_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.report_interval_secs).unwrap_or(DEFAULT_REPORT_INTERVAL)
    }

    /// The grab mode these settings select.
    pub fn grab_mode(&self) -> GrabMode {
        if self.scale_to_target {
            GrabMode::Scale
        } else {
            GrabMode::Source
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            fallback_fps: DEFAULT_FPS,
            fallback_size: FALLBACK_SIZE,
            with_cursor: true,
            report_interval_secs: 1.0,
            scale_to_target: true,
        }
    }
}

#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SettingsError {
    #[error("Failed to parse settings:\n{0}")]
    Parse(#[from] toml::de::Error),

    #[error("Fallback FPS must be positive, got {0}")]
    FallbackFps(f64),

    #[error("Report interval must be a positive number of seconds, got {0}")]
    ReportInterval(f64),

    #[error("Fallback size must be non-zero, got {}x{}", .0[0], .0[1])]
    FallbackSize([u32; 2]),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_is_default() {
        assert_eq!(CaptureSettings::from_toml("").unwrap(), CaptureSettings::default());
    }

    #[test]
    fn partial() {
        let settings = CaptureSettings::from_toml("fallback_fps = 60.0\nwith_cursor = false").unwrap();

        assert_eq!(settings.fallback_fps, 60.0);
        assert!(!settings.with_cursor);
        assert_eq!(settings.fallback_size, [1920, 1080]);
        assert_eq!(settings.grab_mode(), GrabMode::Scale);
    }

    #[test]
    fn round_trip() {
        let settings = CaptureSettings {
            fallback_size: [2560, 1440],
            scale_to_target: false,
            ..CaptureSettings::default()
        };

        let toml = settings.to_toml().unwrap();
        assert_eq!(CaptureSettings::from_toml(&toml).unwrap(), settings);
    }

    #[test]
    fn rejects_invalid() {
        assert!(matches!(
            CaptureSettings::from_toml("fallback_fps = 0.0"),
            Err(SettingsError::FallbackFps(_))
        ));
        assert!(matches!(
            CaptureSettings::from_toml("report_interval_secs = -1.0"),
            Err(SettingsError::ReportInterval(_))
        ));
        assert!(matches!(
            CaptureSettings::from_toml("report_interval_secs = 1e300"),
            Err(SettingsError::ReportInterval(_))
        ));
        assert!(matches!(
            CaptureSettings::from_toml("report_interval_secs = inf"),
            Err(SettingsError::ReportInterval(_))
        ));
        assert!(matches!(
            CaptureSettings::from_toml("fallback_size = [0, 1080]"),
            Err(SettingsError::FallbackSize(_))
        ));
        assert!(matches!(
            CaptureSettings::from_toml("fallback_fps = \"fast\""),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn unusable_report_interval_falls_back() {
        let settings = CaptureSettings {
            report_interval_secs: 1e300,
            ..CaptureSettings::default()
        };
        assert_eq!(settings.report_interval(), Duration::from_secs(1));

        let settings = CaptureSettings {
            report_interval_secs: f64::NAN,
            ..CaptureSettings::default()
        };
        assert_eq!(settings.report_interval(), Duration::from_secs(1));

        let settings = CaptureSettings {
            report_interval_secs: 2.5,
            ..CaptureSettings::default()
        };
        assert_eq!(settings.report_interval(), Duration::from_millis(2500));
    }
}
