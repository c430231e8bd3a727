//! Camera settings: still configuration, sensor controls and the
//! photobooth-level options the adapter is initialized with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::traits::{CameraError, Result};

/// Capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for Resolution {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for (u32, u32) {
    fn from(res: Resolution) -> Self {
        (res.width, res.height)
    }
}

/// Image orientation applied by the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform {
    /// Mirror horizontally.
    pub hflip: bool,
    /// Mirror vertically.
    pub vflip: bool,
}

/// Descriptor for a single-frame capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillConfiguration {
    /// Main stream size.
    pub size: Resolution,
    /// Sensor orientation.
    pub transform: Transform,
}

/// Auto white balance mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwbMode {
    /// Automatic white balance.
    #[default]
    Auto,
    /// Incandescent lighting preset.
    Incandescent,
    /// Tungsten lighting preset.
    Tungsten,
    /// Fluorescent lighting preset.
    Fluorescent,
    /// Indoor lighting preset.
    Indoor,
    /// Daylight preset.
    Daylight,
    /// Cloudy preset.
    Cloudy,
}

/// Sensor control map applied before capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Analogue gain multiplier.
    pub analogue_gain: f32,
    /// White balance mode.
    pub awb_mode: AwbMode,
    /// Exposure time in microseconds.
    pub exposure_time_us: u32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            analogue_gain: 1.0,
            awb_mode: AwbMode::Auto,
            exposure_time_us: 10_000,
        }
    }
}

/// Rotation in degrees, clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees.
    Cw90,
    /// 180 degrees.
    Cw180,
    /// 270 degrees.
    Cw270,
}

impl TryFrom<u32> for Rotation {
    type Error = CameraError;

    fn try_from(degrees: u32) -> Result<Self> {
        match degrees {
            0 => Ok(Self::None),
            90 => Ok(Self::Cw90),
            180 => Ok(Self::Cw180),
            270 => Ok(Self::Cw270),
            other => Err(CameraError::InvalidArgument(format!(
                "Invalid camera rotation value '{other}' (should be 0, 90, 180 or 270)"
            ))),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

/// Settings the photobooth hands to the camera on initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    resolution: Resolution,
    preview_rotation: Rotation,
    capture_rotation: Rotation,
    preview_flip: bool,
    capture_flip: bool,
    border: u32,
    jpeg_quality: u8,
    controls: Controls,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::new(3280, 2464),
            preview_rotation: Rotation::None,
            capture_rotation: Rotation::None,
            preview_flip: false,
            capture_flip: false,
            border: 50,
            jpeg_quality: 75,
            controls: Controls::default(),
        }
    }
}

impl CameraConfig {
    /// Parse settings from a JSON document. Missing fields keep their default.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the settings are usable by a camera.
    pub fn validate(&self) -> Result<()> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(CameraError::InvalidArgument(format!(
                "Resolution {}x{} has a zero dimension",
                self.resolution.width, self.resolution.height
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CameraError::InvalidArgument(format!(
                "JPEG quality {} out of range 1-100",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Still configuration derived from these settings.
    #[must_use]
    pub const fn still_configuration(&self) -> StillConfiguration {
        StillConfiguration {
            size: self.resolution,
            transform: Transform {
                hflip: self.capture_flip,
                vflip: false,
            },
        }
    }

    /// Set the capture resolution.
    #[must_use]
    pub const fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Resolution::new(width, height);
        self
    }

    /// Set the same rotation for preview and capture.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.preview_rotation = rotation;
        self.capture_rotation = rotation;
        self
    }

    /// Set the preview rotation.
    #[must_use]
    pub const fn with_preview_rotation(mut self, rotation: Rotation) -> Self {
        self.preview_rotation = rotation;
        self
    }

    /// Set the capture rotation.
    #[must_use]
    pub const fn with_capture_rotation(mut self, rotation: Rotation) -> Self {
        self.capture_rotation = rotation;
        self
    }

    /// Set the same flip for preview and capture.
    #[must_use]
    pub const fn with_flip(mut self, flip: bool) -> Self {
        self.preview_flip = flip;
        self.capture_flip = flip;
        self
    }

    /// Set the preview flip.
    #[must_use]
    pub const fn with_preview_flip(mut self, flip: bool) -> Self {
        self.preview_flip = flip;
        self
    }

    /// Set the capture flip.
    #[must_use]
    pub const fn with_capture_flip(mut self, flip: bool) -> Self {
        self.capture_flip = flip;
        self
    }

    /// Set the border kept around the preview, in pixels.
    #[must_use]
    pub const fn with_border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }

    /// Set the JPEG quality (1-100).
    #[must_use]
    pub const fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the sensor controls.
    #[must_use]
    pub const fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }

    /// Capture resolution.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Rotation requested for the preview.
    #[must_use]
    pub const fn preview_rotation(&self) -> Rotation {
        self.preview_rotation
    }

    /// Rotation applied to decoded captures.
    #[must_use]
    pub const fn capture_rotation(&self) -> Rotation {
        self.capture_rotation
    }

    /// Whether the preview is mirrored.
    #[must_use]
    pub const fn preview_flip(&self) -> bool {
        self.preview_flip
    }

    /// Whether captures are mirrored by the sensor.
    #[must_use]
    pub const fn capture_flip(&self) -> bool {
        self.capture_flip
    }

    /// Border kept around the preview, in pixels.
    #[must_use]
    pub const fn border(&self) -> u32 {
        self.border
    }

    /// JPEG quality used when encoding captures.
    #[must_use]
    pub const fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Sensor controls applied on initialization.
    #[must_use]
    pub const fn controls(&self) -> &Controls {
        &self.controls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controls() {
        let controls = Controls::default();
        assert!((controls.analogue_gain - 1.0).abs() < f32::EPSILON);
        assert_eq!(controls.awb_mode, AwbMode::Auto);
        assert_eq!(controls.exposure_time_us, 10_000);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::try_from(270).expect("valid rotation"), Rotation::Cw270);
        let err = Rotation::try_from(45).expect_err("45 should be rejected");
        assert!(matches!(err, CameraError::InvalidArgument(_)));
    }

    #[test]
    fn test_still_configuration_uses_capture_flip() {
        let config = CameraConfig::default()
            .with_resolution(1920, 1080)
            .with_preview_flip(false)
            .with_capture_flip(true);
        let still = config.still_configuration();
        assert_eq!(still.size, Resolution::new(1920, 1080));
        assert!(still.transform.hflip);
        assert!(!still.transform.vflip);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CameraConfig::from_json_str(
            r#"{"resolution": [1640, 1232], "capture_rotation": 90,
                "controls": {"awb_mode": "daylight"}}"#,
        )
        .expect("parse failed");
        assert_eq!(config.resolution(), Resolution::new(1640, 1232));
        assert_eq!(config.capture_rotation(), Rotation::Cw90);
        assert_eq!(config.preview_rotation(), Rotation::None);
        assert_eq!(config.controls().awb_mode, AwbMode::Daylight);
        assert_eq!(config.controls().exposure_time_us, 10_000);
        assert_eq!(config.border(), 50);
    }

    #[test]
    fn test_from_json_bad_rotation() {
        let result = CameraConfig::from_json_str(r#"{"preview_rotation": 45}"#);
        assert!(matches!(result, Err(CameraError::Config(_))));
    }

    #[test]
    fn test_from_json_rejects_unknown_setting() {
        let result = CameraConfig::from_json_str(r#"{"delete_internal_memory": true}"#);
        assert!(matches!(result, Err(CameraError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_resolution() {
        let config = CameraConfig::default().with_resolution(0, 480);
        assert!(matches!(
            config.validate(),
            Err(CameraError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_rejects_quality() {
        let config = CameraConfig::default().with_jpeg_quality(0);
        assert!(config.validate().is_err());
    }
}
