//! Core traits and types for the photobooth camera abstraction.

use std::time::Duration;

use image::{ImageFormat, RgbImage};

use crate::config::{Controls, StillConfiguration};

/// Pixel format representation (e.g., YUYV, MJPG, RGB3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create a new `FourCC` from a 4-byte array.
    #[must_use]
    pub const fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }

    /// YUYV pixel format (4:2:2 packed).
    pub const YUYV: Self = Self::new(b"YUYV");
    /// MJPEG pixel format (Motion JPEG).
    pub const MJPG: Self = Self::new(b"MJPG");
    /// RGB3 pixel format (24-bit RGB).
    pub const RGB3: Self = Self::new(b"RGB3");

    /// Bytes per pixel for packed formats, 0 for compressed ones.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self.0 {
            [b'R', b'G', b'B', b'3'] => 3,
            [b'Y', b'U', b'Y', b'V'] => 2,
            _ => 0,
        }
    }
}

impl From<v4l::FourCC> for FourCC {
    fn from(fourcc: v4l::FourCC) -> Self {
        Self(fourcc.repr)
    }
}

impl From<FourCC> for v4l::FourCC {
    fn from(fourcc: FourCC) -> Self {
        Self::new(&fourcc.0)
    }
}

/// Video format specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format.
    pub fourcc: FourCC,
    /// Bytes per line (stride). Zero for compressed formats.
    pub stride: u32,
    /// Total frame size in bytes. Zero for compressed formats.
    pub size: u32,
}

impl Format {
    /// Create a new format specification with a tightly packed stride.
    #[must_use]
    pub const fn new(width: u32, height: u32, fourcc: FourCC) -> Self {
        let stride = width * fourcc.bytes_per_pixel();
        let size = stride * height;
        Self {
            width,
            height,
            fourcc,
            stride,
            size,
        }
    }
}

/// Device capability flags.
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Driver name.
    pub driver: String,
    /// Card/device name.
    pub card: String,
    /// Bus information.
    pub bus_info: String,
    /// Whether the device can capture video.
    pub can_capture: bool,
    /// Whether the device supports streaming.
    pub can_stream: bool,
}

/// Metadata for a captured frame.
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    /// Frame sequence number.
    pub sequence: u32,
    /// Capture timestamp.
    pub timestamp: Duration,
    /// Actual bytes used in the frame buffer.
    pub bytes_used: u32,
}

/// A raw frame as returned by the camera handle.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw frame data.
    pub data: Vec<u8>,
    /// Frame metadata.
    pub metadata: FrameMetadata,
}

impl Frame {
    /// Convert the frame into an 8-bit RGB image.
    ///
    /// RGB3 rows are copied without their stride padding, YUYV is converted
    /// with BT.601 coefficients and MJPG frames are decoded.
    pub fn to_rgb_image(&self, format: &Format) -> Result<RgbImage> {
        match format.fourcc {
            FourCC::RGB3 => self.packed_rgb(format),
            FourCC::YUYV => self.packed_yuyv(format),
            FourCC::MJPG => {
                Ok(image::load_from_memory_with_format(&self.data, ImageFormat::Jpeg)?.to_rgb8())
            }
            _ => Err(CameraError::FormatNotSupported(format.clone())),
        }
    }

    fn packed_rgb(&self, format: &Format) -> Result<RgbImage> {
        let row_len = (format.width * 3) as usize;
        let stride = if format.stride == 0 {
            row_len
        } else {
            format.stride as usize
        };

        let mut pixels = Vec::with_capacity(row_len * format.height as usize);
        for row in 0..format.height as usize {
            let start = row * stride;
            let line = self
                .data
                .get(start..start + row_len)
                .ok_or_else(|| short_frame(self.data.len(), format))?;
            pixels.extend_from_slice(line);
        }

        RgbImage::from_raw(format.width, format.height, pixels)
            .ok_or_else(|| short_frame(self.data.len(), format))
    }

    fn packed_yuyv(&self, format: &Format) -> Result<RgbImage> {
        let width = format.width as usize;
        let row_len = width.div_ceil(2) * 4;
        let stride = if format.stride == 0 {
            width * 2
        } else {
            format.stride as usize
        };

        let mut pixels = Vec::with_capacity(width * format.height as usize * 3);
        for row in 0..format.height as usize {
            let start = row * stride;
            let line = self
                .data
                .get(start..start + row_len)
                .ok_or_else(|| short_frame(self.data.len(), format))?;

            for (pair, chunk) in line.chunks_exact(4).enumerate() {
                let &[y0, u, y1, v] = chunk else {
                    continue;
                };
                let (r, g, b) = yuv_to_rgb(y0, u, v);
                pixels.extend_from_slice(&[r, g, b]);
                if pair * 2 + 1 < width {
                    let (r, g, b) = yuv_to_rgb(y1, u, v);
                    pixels.extend_from_slice(&[r, g, b]);
                }
            }
        }

        RgbImage::from_raw(format.width, format.height, pixels)
            .ok_or_else(|| short_frame(self.data.len(), format))
    }
}

fn short_frame(len: usize, format: &Format) -> CameraError {
    CameraError::StreamError(format!(
        "Frame of {len} bytes too short for {}x{} {:?}",
        format.width, format.height, format.fourcc
    ))
}

/// Convert YUV values to RGB.
///
/// Uses the ITU-R BT.601 conversion formula. Channels are clamped to 0-255.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub(crate) fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y_f = f32::from(y);
    let u_f = f32::from(u) - 128.0;
    let v_f = f32::from(v) - 128.0;

    let r = 1.402f32.mul_add(v_f, y_f);
    let g = 0.714_14f32.mul_add(-v_f, 0.344_14f32.mul_add(-u_f, y_f));
    let b = 1.772f32.mul_add(u_f, y_f);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamp = |val: f32| -> u8 { val.clamp(0.0, 255.0) as u8 };

    (clamp(r), clamp(g), clamp(b))
}

/// Error type for camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// Device with given index was not found.
    DeviceNotFound(u32),
    /// Failed to open device.
    DeviceOpenFailed(String),
    /// Requested format is not supported.
    FormatNotSupported(Format),
    /// Error during streaming operation.
    StreamError(String),
    /// A sensor control could not be applied.
    ControlFailed(String),
    /// Caller supplied an invalid argument.
    InvalidArgument(String),
    /// The backend has no equivalent of the requested capability.
    Unsupported(&'static str),
    /// Capture requested before the stream was started.
    NotStarted,
    /// Image encoding or decoding failed.
    Image(image::ImageError),
    /// Settings could not be parsed.
    Config(serde_json::Error),
    /// I/O error.
    Io(std::io::Error),
}

impl std::fmt::Display for CameraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceNotFound(idx) => write!(f, "Device {idx} not found"),
            Self::DeviceOpenFailed(msg) => write!(f, "Failed to open device: {msg}"),
            Self::FormatNotSupported(fmt) => write!(f, "Format not supported: {fmt:?}"),
            Self::StreamError(msg) => write!(f, "Stream error: {msg}"),
            Self::ControlFailed(msg) => write!(f, "Failed to set control: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::Unsupported(what) => write!(f, "Unsupported by camera backend: {what}"),
            Self::NotStarted => write!(f, "Camera is not started"),
            Self::Image(err) => write!(f, "Image error: {err}"),
            Self::Config(err) => write!(f, "Invalid camera settings: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CameraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err)
    }
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Abstraction over the vendor camera SDK.
///
/// The adapter only ever talks to the hardware through this trait. Errors
/// raised by an implementation are propagated unchanged to the caller.
pub trait CameraHandle {
    /// Get device capabilities.
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Apply a still configuration. Returns the format chosen by the driver.
    fn configure(&mut self, config: &StillConfiguration) -> Result<Format>;

    /// Apply the sensor control map.
    fn set_controls(&mut self, controls: &Controls) -> Result<()>;

    /// Start the capture stream.
    fn start(&mut self) -> Result<()>;

    /// Capture a single raw frame in the configured format.
    fn capture_array(&mut self) -> Result<Frame>;

    /// Whether the backend can open its own preview window.
    fn supports_preview(&self) -> bool {
        false
    }

    /// Open the backend preview window.
    fn start_preview(&mut self) -> Result<()> {
        Err(CameraError::Unsupported("preview window"))
    }

    /// Close the backend preview window.
    fn stop_preview(&mut self) -> Result<()> {
        Err(CameraError::Unsupported("preview window"))
    }

    /// Stop the capture stream.
    fn stop(&mut self) -> Result<()>;

    /// Release the device.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
