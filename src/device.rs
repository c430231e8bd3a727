//! V4L2 camera handle using the v4l crate.

use std::collections::HashMap;
use std::time::Duration;

use v4l::buffer::Type;
use v4l::control::{Control, Description, Value};
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::Device;

use crate::config::{AwbMode, Controls, StillConfiguration, Transform};
use crate::traits::{
    CameraError, CameraHandle, DeviceCapabilities, Format, FourCC, Frame, FrameMetadata, Result,
};

const CID_HFLIP: u32 = 0x0098_0914;
const CID_VFLIP: u32 = 0x0098_0915;
const CID_EXPOSURE_AUTO: u32 = 0x009a_0901;
const CID_EXPOSURE_ABSOLUTE: u32 = 0x009a_0902;
const CID_AUTO_N_PRESET_WHITE_BALANCE: u32 = 0x009a_0914;
const CID_ANALOGUE_GAIN: u32 = 0x009e_0903;

/// `V4L2_EXPOSURE_MANUAL` entry of the exposure menu.
const EXPOSURE_MANUAL: i64 = 1;
/// `V4L2_CID_EXPOSURE_ABSOLUTE` counts in units of 100 µs.
const EXPOSURE_UNIT_US: u32 = 100;
/// Analogue gain is passed as Q8 fixed point.
const GAIN_ONE: f32 = 256.0;

/// Buffers queued for a still capture.
const BUFFER_COUNT: u32 = 4;
/// Frames dropped while the sensor settles after stream on.
const WARMUP_FRAMES: usize = 2;

/// Pixel formats we can turn into RGB, most preferred first.
const SUPPORTED_FOURCCS: [FourCC; 3] = [FourCC::RGB3, FourCC::YUYV, FourCC::MJPG];

/// Camera handle driving a V4L2 capture device.
pub struct V4L2Device {
    device: Device,
    capabilities: DeviceCapabilities,
    controls: HashMap<u32, Description>,
    streaming: bool,
}

impl V4L2Device {
    /// Open a V4L2 device by index (e.g., 0 for /dev/video0).
    pub fn open(index: u32) -> Result<Self> {
        let device = Device::new(index as usize).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CameraError::DeviceNotFound(index)
            } else {
                CameraError::DeviceOpenFailed(err.to_string())
            }
        })?;

        let caps = device
            .query_caps()
            .map_err(|err| CameraError::DeviceOpenFailed(err.to_string()))?;

        let capabilities = DeviceCapabilities {
            driver: caps.driver,
            card: caps.card,
            bus_info: caps.bus,
            can_capture: caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE),
            can_stream: caps.capabilities.contains(v4l::capability::Flags::STREAMING),
        };

        let controls = device
            .query_controls()
            .map_err(|err| CameraError::DeviceOpenFailed(err.to_string()))?
            .into_iter()
            .map(|desc| (desc.id, desc))
            .collect();

        log::debug!(
            "opened /dev/video{index}: {} ({})",
            capabilities.card,
            capabilities.driver
        );

        Ok(Self {
            device,
            capabilities,
            controls,
            streaming: false,
        })
    }

    /// Set an integer control, clamped to the driver's range.
    ///
    /// Returns `false` when the driver does not expose the control.
    fn set_integer(&self, id: u32, value: i64) -> Result<bool> {
        let Some(desc) = self.controls.get(&id) else {
            return Ok(false);
        };
        let value = if desc.minimum <= desc.maximum {
            value.clamp(desc.minimum, desc.maximum)
        } else {
            value
        };
        log::debug!("set control '{}' = {value}", desc.name);
        self.write_control(desc, Value::Integer(value))
    }

    fn set_boolean(&self, id: u32, value: bool) -> Result<bool> {
        let Some(desc) = self.controls.get(&id) else {
            return Ok(false);
        };
        log::debug!("set control '{}' = {value}", desc.name);
        self.write_control(desc, Value::Boolean(value))
    }

    fn write_control(&self, desc: &Description, value: Value) -> Result<bool> {
        self.device
            .set_control(Control { id: desc.id, value })
            .map_err(|err| CameraError::ControlFailed(format!("{}: {err}", desc.name)))?;
        Ok(true)
    }

    fn set_transform(&self, transform: Transform) -> Result<()> {
        for (id, flip, name) in [
            (CID_HFLIP, transform.hflip, "horizontal flip"),
            (CID_VFLIP, transform.vflip, "vertical flip"),
        ] {
            if !self.set_boolean(id, flip)? && flip {
                log::warn!("{name} not supported by driver, ignoring it");
            }
        }
        Ok(())
    }
}

const fn awb_preset(mode: AwbMode) -> i64 {
    // V4L2_WHITE_BALANCE_* menu entries
    match mode {
        AwbMode::Auto => 1,
        AwbMode::Incandescent | AwbMode::Tungsten => 2,
        AwbMode::Fluorescent => 3,
        AwbMode::Indoor => 4,
        AwbMode::Daylight => 6,
        AwbMode::Cloudy => 8,
    }
}

impl CameraHandle for V4L2Device {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn configure(&mut self, config: &StillConfiguration) -> Result<Format> {
        let mut fmt = self
            .device
            .format()
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        fmt.width = config.size.width;
        fmt.height = config.size.height;
        fmt.fourcc = FourCC::RGB3.into();

        let fmt = self
            .device
            .set_format(&fmt)
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        let format = Format {
            width: fmt.width,
            height: fmt.height,
            fourcc: FourCC::from(fmt.fourcc),
            stride: fmt.stride,
            size: fmt.size,
        };

        if !SUPPORTED_FOURCCS.contains(&format.fourcc) {
            return Err(CameraError::FormatNotSupported(format));
        }
        if format.width != config.size.width || format.height != config.size.height {
            log::warn!(
                "driver adjusted resolution {}x{} to {}x{}",
                config.size.width,
                config.size.height,
                format.width,
                format.height
            );
        }

        self.set_transform(config.transform)?;
        Ok(format)
    }

    fn set_controls(&mut self, controls: &Controls) -> Result<()> {
        self.set_integer(CID_EXPOSURE_AUTO, EXPOSURE_MANUAL)?;
        let exposure = i64::from(controls.exposure_time_us / EXPOSURE_UNIT_US);
        if !self.set_integer(CID_EXPOSURE_ABSOLUTE, exposure)? {
            log::warn!("exposure time not supported by driver, ignoring it");
        }

        if !self.set_integer(CID_AUTO_N_PRESET_WHITE_BALANCE, awb_preset(controls.awb_mode))? {
            log::warn!("white balance mode not supported by driver, ignoring it");
        }

        #[allow(clippy::cast_possible_truncation)]
        let gain = (controls.analogue_gain * GAIN_ONE).round() as i64;
        if !self.set_integer(CID_ANALOGUE_GAIN, gain)? {
            log::warn!("analogue gain not supported by driver, ignoring it");
        }
        Ok(())
    }

    /// Mark the device ready for capture.
    ///
    /// No stream is kept open between captures. Each [`capture_array`] call
    /// maps its own buffers and releases them before returning.
    ///
    /// [`capture_array`]: CameraHandle::capture_array
    fn start(&mut self) -> Result<()> {
        if !self.capabilities.can_capture || !self.capabilities.can_stream {
            return Err(CameraError::StreamError(format!(
                "{} cannot stream video capture",
                self.capabilities.card
            )));
        }
        self.streaming = true;
        Ok(())
    }

    /// Open an mmap stream of `BUFFER_COUNT` buffers, drop `WARMUP_FRAMES`
    /// frames while exposure settles, and return the next one.
    fn capture_array(&mut self) -> Result<Frame> {
        if !self.streaming {
            return Err(CameraError::NotStarted);
        }

        let mut stream = Stream::with_buffers(&self.device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        for _ in 0..WARMUP_FRAMES {
            stream
                .next()
                .map_err(|err| CameraError::StreamError(err.to_string()))?;
        }

        let (buf, meta) = stream
            .next()
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        // Compressed frames only fill part of the buffer
        let data = match meta.bytesused as usize {
            0 => buf,
            used => buf.get(..used).unwrap_or(buf),
        };

        // Safe conversions: V4L2 timestamps are always non-negative in practice
        #[allow(clippy::cast_sign_loss)]
        let secs = meta.timestamp.sec.max(0) as u64;
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let nanos = (meta.timestamp.usec.max(0) as u32).saturating_mul(1000);

        Ok(Frame {
            data: data.to_vec(),
            metadata: FrameMetadata {
                sequence: meta.sequence,
                timestamp: Duration::new(secs, nanos),
                bytes_used: meta.bytesused,
            },
        })
    }

    fn stop(&mut self) -> Result<()> {
        self.streaming = false;
        Ok(())
    }

    fn close(self) -> Result<()> {
        log::debug!("releasing {}", self.capabilities.card);
        drop(self.device);
        Ok(())
    }
}
