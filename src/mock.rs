//! Mock camera handle for testing without hardware.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::{Controls, StillConfiguration};
use crate::traits::{
    CameraError, CameraHandle, DeviceCapabilities, Format, FourCC, Frame, FrameMetadata, Result,
};

/// Calls received by a [`MockDevice`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleCall {
    /// `configure` with the requested still configuration.
    Configure(StillConfiguration),
    /// `set_controls` with the requested control map.
    SetControls(Controls),
    /// `start`.
    Start,
    /// `capture_array`.
    Capture,
    /// `start_preview`.
    StartPreview,
    /// `stop_preview`.
    StopPreview,
    /// `stop`.
    Stop,
    /// `close`.
    Close,
}

/// Shared record of handle calls, readable after the device is consumed.
pub type CallLog = Rc<RefCell<Vec<HandleCall>>>;

/// Test pattern types for mock frame generation.
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// SMPTE color bars pattern.
    ColorBars,
    /// Horizontal gradient from dark to light.
    Gradient,
    /// Solid color with specified Y, U, V values.
    Solid(u8, u8, u8),
}

/// Mock device for testing without hardware.
pub struct MockDevice {
    capabilities: DeviceCapabilities,
    fourcc: FourCC,
    format: Format,
    pattern: TestPattern,
    preview: bool,
    streaming: bool,
    fail_configure: bool,
    frame_count: u32,
    calls: CallLog,
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDevice {
    /// Create a new mock device producing RGB3 color bars.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities {
                driver: "mock".to_owned(),
                card: "Mock Camera".to_owned(),
                bus_info: "mock:0".to_owned(),
                can_capture: true,
                can_stream: true,
            },
            fourcc: FourCC::RGB3,
            format: Format::new(640, 480, FourCC::RGB3),
            pattern: TestPattern::ColorBars,
            preview: false,
            streaming: false,
            fail_configure: false,
            frame_count: 0,
            calls: Rc::default(),
        }
    }

    /// Pixel format negotiated on `configure`.
    #[must_use]
    pub const fn with_fourcc(mut self, fourcc: FourCC) -> Self {
        self.fourcc = fourcc;
        self
    }

    /// Pattern of the captured frames.
    #[must_use]
    pub const fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Pretend the backend has a native preview window.
    #[must_use]
    pub const fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Make `configure` fail like a busy device would.
    #[must_use]
    pub const fn with_failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    /// Handle on the call log.
    #[must_use]
    pub fn calls(&self) -> CallLog {
        Rc::clone(&self.calls)
    }

    fn record(&self, call: HandleCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl CameraHandle for MockDevice {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn configure(&mut self, config: &StillConfiguration) -> Result<Format> {
        self.record(HandleCall::Configure(*config));
        if self.fail_configure {
            return Err(CameraError::DeviceOpenFailed("Device or resource busy".to_owned()));
        }
        self.format = Format::new(config.size.width, config.size.height, self.fourcc);
        Ok(self.format.clone())
    }

    fn set_controls(&mut self, controls: &Controls) -> Result<()> {
        self.record(HandleCall::SetControls(*controls));
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.record(HandleCall::Start);
        self.streaming = true;
        Ok(())
    }

    fn capture_array(&mut self) -> Result<Frame> {
        self.record(HandleCall::Capture);
        if !self.streaming {
            return Err(CameraError::NotStarted);
        }

        let data = generate_test_frame(&self.format, self.pattern);
        let seq = self.frame_count;
        self.frame_count += 1;

        Ok(Frame {
            data,
            metadata: FrameMetadata {
                sequence: seq,
                timestamp: Duration::from_millis(u64::from(seq) * 33), // ~30fps
                bytes_used: self.format.size,
            },
        })
    }

    fn supports_preview(&self) -> bool {
        self.preview
    }

    fn start_preview(&mut self) -> Result<()> {
        self.record(HandleCall::StartPreview);
        if self.preview {
            Ok(())
        } else {
            Err(CameraError::Unsupported("preview window"))
        }
    }

    fn stop_preview(&mut self) -> Result<()> {
        self.record(HandleCall::StopPreview);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.record(HandleCall::Stop);
        self.streaming = false;
        Ok(())
    }

    fn close(self) -> Result<()> {
        self.record(HandleCall::Close);
        Ok(())
    }
}

/// SMPTE bars as YUV: White, Yellow, Cyan, Green, Magenta, Red, Blue, Black.
const BARS_YUV: [(u8, u8, u8); 8] = [
    (235, 128, 128),
    (210, 16, 146),
    (170, 166, 16),
    (145, 54, 34),
    (106, 202, 222),
    (81, 90, 240),
    (41, 240, 110),
    (16, 128, 128),
];

/// Generate test frame data based on pattern.
fn generate_test_frame(format: &Format, pattern: TestPattern) -> Vec<u8> {
    let width = format.width;
    let height = format.height;
    let yuv_at = |x: u32| -> (u8, u8, u8) {
        match pattern {
            TestPattern::ColorBars => {
                let bar_width = (width / 8).max(1);
                BARS_YUV[(x / bar_width).min(7) as usize]
            }
            TestPattern::Gradient => {
                #[allow(clippy::cast_possible_truncation)]
                let y_val = ((x * 255) / width.max(1)) as u8;
                (y_val, 128, 128)
            }
            TestPattern::Solid(y, u, v) => (y, u, v),
        }
    };

    if format.fourcc == FourCC::YUYV {
        let mut data = Vec::with_capacity((width * height * 2) as usize);
        for _ in 0..height {
            for x in (0..width).step_by(2) {
                let (y_val, u, v) = yuv_at(x);
                data.extend_from_slice(&[y_val, u, y_val, v]);
            }
        }
        return data;
    }

    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..height {
        for x in 0..width {
            let (y_val, u, v) = yuv_at(x);
            let (r, g, b) = crate::traits::yuv_to_rgb(y_val, u, v);
            data.extend_from_slice(&[r, g, b]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Resolution, Transform};

    fn still(width: u32, height: u32) -> StillConfiguration {
        StillConfiguration {
            size: Resolution::new(width, height),
            transform: Transform::default(),
        }
    }

    #[test]
    fn test_mock_device_creation() {
        let device = MockDevice::new();
        assert_eq!(device.capabilities().driver, "mock");
        assert!(device.capabilities().can_capture);
        assert!(device.capabilities().can_stream);
    }

    #[test]
    fn test_mock_device_configure() {
        let mut device = MockDevice::new().with_fourcc(FourCC::YUYV);
        let format = device.configure(&still(1280, 720)).expect("configure should succeed");
        assert_eq!(format.width, 1280);
        assert_eq!(format.height, 720);
        assert_eq!(format.fourcc, FourCC::YUYV);
    }

    #[test]
    fn test_capture_requires_start() {
        let mut device = MockDevice::new();
        device.configure(&still(64, 48)).expect("configure should succeed");
        assert!(matches!(device.capture_array(), Err(CameraError::NotStarted)));

        device.start().expect("start should succeed");
        let frame1 = device.capture_array().expect("capture should succeed");
        assert_eq!(frame1.metadata.sequence, 0);
        assert_eq!(frame1.data.len(), 64 * 48 * 3);

        let frame2 = device.capture_array().expect("capture should succeed");
        assert_eq!(frame2.metadata.sequence, 1);
    }

    #[test]
    fn test_color_bars_yuyv() {
        let format = Format::new(640, 480, FourCC::YUYV);
        let data = generate_test_frame(&format, TestPattern::ColorBars);
        assert_eq!(data.len(), 640 * 480 * 2);
        // First bar should be white (Y=235)
        assert_eq!(data[0], 235);
    }

    #[test]
    fn test_solid_rgb() {
        let format = Format::new(8, 8, FourCC::RGB3);
        let data = generate_test_frame(&format, TestPattern::Solid(128, 128, 128));
        assert_eq!(data.len(), 8 * 8 * 3);
        assert!(data.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_call_log_survives_close() {
        let device = MockDevice::new();
        let calls = device.calls();
        device.close().expect("close should succeed");
        assert_eq!(*calls.borrow(), vec![HandleCall::Close]);
    }
}
