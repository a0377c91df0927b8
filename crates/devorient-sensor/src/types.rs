use serde::{Deserialize, Deserializer};

/// One W3C `deviceorientation` reading, angles in degrees.
///
/// Any component may be missing. Missing components count as zero when the
/// sample is turned into a rotation, so a partial sample still fully
/// determines one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct OrientationSample {
    /// Rotation about the Earth's vertical axis (heading), 0..360.
    #[serde(default, deserialize_with = "lenient_angle")]
    pub alpha: Option<f64>,
    /// Front-to-back tilt, -180..180.
    #[serde(default, deserialize_with = "lenient_angle")]
    pub beta: Option<f64>,
    /// Left-to-right tilt, -90..90.
    #[serde(default, deserialize_with = "lenient_angle")]
    pub gamma: Option<f64>,
    /// Whether alpha is referenced to true north. Not used by the transform.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub absolute: bool,
}

impl OrientationSample {
    /// Sample with all three angles present.
    pub fn degrees(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
            absolute: false,
        }
    }
}

/// Screen rotation relative to the device's natural orientation, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenOrientation(pub f64);

impl ScreenOrientation {
    /// Build from whatever the platform reported, defaulting to 0.
    pub fn from_platform(angle: Option<f64>) -> Self {
        Self(angle_or_zero(angle))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }
}

/// Coerce a reported angle to a number: absent, NaN and infinite values are 0.
pub fn angle_or_zero(angle: Option<f64>) -> f64 {
    match angle {
        Some(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Which platform notification an event or handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DeviceOrientation,
    OrientationChange,
}

/// A notification delivered by an orientation event source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationEvent {
    /// New attitude reading from the sensor.
    DeviceOrientation(OrientationSample),
    /// The screen was rotated; carries the new angle if the platform knows it.
    OrientationChange(Option<f64>),
}

impl OrientationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            OrientationEvent::DeviceOrientation(_) => EventKind::DeviceOrientation,
            OrientationEvent::OrientationChange(_) => EventKind::OrientationChange,
        }
    }
}

// Sensor feeds are not trusted to be well typed: anything that is not a
// finite number is treated as missing instead of failing the whole sample.
pub(crate) fn lenient_angle<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value.as_bool().unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_or_zero_defaults() {
        assert_eq!(angle_or_zero(None), 0.0);
        assert_eq!(angle_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(angle_or_zero(Some(f64::INFINITY)), 0.0);
        assert_eq!(angle_or_zero(Some(-45.0)), -45.0);
    }

    #[test]
    fn screen_orientation_from_platform() {
        assert_eq!(ScreenOrientation::from_platform(None), ScreenOrientation(0.0));
        assert_eq!(ScreenOrientation::from_platform(Some(90.0)).degrees(), 90.0);
        assert!((ScreenOrientation(180.0).radians() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn sample_tolerates_bad_fields() {
        let sample: OrientationSample =
            serde_json::from_str(r#"{"alpha":"north","beta":12.5,"gamma":null,"absolute":1}"#)
                .unwrap();
        assert_eq!(sample.alpha, None);
        assert_eq!(sample.beta, Some(12.5));
        assert_eq!(sample.gamma, None);
        assert!(!sample.absolute);
    }

    #[test]
    fn sample_missing_fields_are_none() {
        let sample: OrientationSample = serde_json::from_str("{}").unwrap();
        assert_eq!(sample, OrientationSample::default());
    }
}
