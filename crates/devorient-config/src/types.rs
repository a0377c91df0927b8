use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slowest and fastest accepted frame rates.
pub const MIN_FRAME_RATE_HZ: f32 = 1.0;
pub const MAX_FRAME_RATE_HZ: f32 = 1000.0;

const DEFAULT_FRAME_RATE_HZ: f32 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How often the rotation is recomputed, in frames per second.
    pub frame_rate_hz: f32,
    /// Orientation controls configuration.
    pub controls: ControlsConfig,
    /// Sensor stream configuration.
    pub sensor: SensorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
            controls: ControlsConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Time between frames. The rate is clamped to
    /// `MIN_FRAME_RATE_HZ..=MAX_FRAME_RATE_HZ`; NaN falls back to the default.
    pub fn frame_period(&self) -> Duration {
        let rate = if self.frame_rate_hz.is_nan() {
            DEFAULT_FRAME_RATE_HZ
        } else {
            self.frame_rate_hz.clamp(MIN_FRAME_RATE_HZ, MAX_FRAME_RATE_HZ)
        };
        Duration::from_secs_f32(1.0 / rate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Heading bias added to reported alpha, in degrees.
    pub alpha_offset_degrees: f32,
    /// Whether rotation updates start enabled.
    pub enabled: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            alpha_offset_degrees: 0.0,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// `host:port` of the orientation relay.
    pub addr: String,
    /// Give up connecting after this long and run without a sensor.
    pub connect_timeout_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:7878".to_string(),
            connect_timeout_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period_for(frame_rate_hz: f32) -> Duration {
        AppConfig {
            frame_rate_hz,
            ..AppConfig::default()
        }
        .frame_period()
    }

    #[test]
    fn frame_period_for_normal_rate() {
        assert!((period_for(50.0).as_secs_f64() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn frame_period_is_clamped() {
        assert_eq!(period_for(f32::INFINITY), period_for(MAX_FRAME_RATE_HZ));
        assert_eq!(period_for(1e12), period_for(MAX_FRAME_RATE_HZ));
        assert_eq!(period_for(0.0), Duration::from_secs(1));
        assert_eq!(period_for(-30.0), Duration::from_secs(1));
        assert_eq!(period_for(f32::NAN), period_for(DEFAULT_FRAME_RATE_HZ));
        assert!(period_for(f32::INFINITY) > Duration::ZERO);
    }

    #[test]
    fn infinite_rate_from_toml_yields_nonzero_period() {
        let config: AppConfig = toml::from_str("frame_rate_hz = inf").unwrap();
        assert!(config.frame_period() >= Duration::from_millis(1));
    }
}
