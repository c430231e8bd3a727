//! Raspberry Pi camera detection.
//!
//! A camera is reported only when the capture SDK is usable on this host and
//! the firmware says a camera module is connected (`vcgencmd get_camera`).

use std::path::PathBuf;
use std::process::Command;

use crate::device::V4L2Device;
use crate::traits::{CameraHandle, Result};

/// Marker printed by the firmware when a camera module is connected.
pub const DETECTED_MARKER: &str = "detected=1";

/// Source of the firmware camera status.
pub trait HardwareProbe {
    /// Raw standard output of the status query.
    ///
    /// `Ok(None)` means the query ran but reported failure. `Err` means it
    /// could not be spawned at all.
    fn camera_status(&self) -> std::io::Result<Option<Vec<u8>>>;
}

/// Queries the VideoCore firmware through `vcgencmd get_camera`.
#[derive(Debug, Clone)]
pub struct Vcgencmd {
    program: PathBuf,
}

impl Default for Vcgencmd {
    fn default() -> Self {
        Self {
            program: PathBuf::from("vcgencmd"),
        }
    }
}

impl Vcgencmd {
    /// Use a specific `vcgencmd` binary.
    #[must_use]
    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl HardwareProbe for Vcgencmd {
    fn camera_status(&self) -> std::io::Result<Option<Vec<u8>>> {
        let output = Command::new(&self.program).arg("get_camera").output()?;
        if !output.status.success() {
            log::debug!(
                "{} get_camera exited with {}",
                self.program.display(),
                output.status
            );
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }
}

/// Whether the status output reports a connected camera.
#[must_use]
pub fn is_camera_detected(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout).contains(DETECTED_MARKER)
}

/// Entry point of a capture SDK.
pub trait CameraSdk {
    /// Handle type produced by [`CameraSdk::open`].
    type Handle: CameraHandle;

    /// Whether the SDK can be used on this host.
    fn is_available(&self) -> bool;

    /// Open the camera.
    fn open(&self) -> Result<Self::Handle>;
}

/// V4L2 access to the camera module.
#[derive(Debug, Clone, Copy, Default)]
pub struct V4l2Sdk {
    index: u32,
}

impl V4l2Sdk {
    /// SDK bound to `/dev/video{index}`.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self { index }
    }

    /// Device node path.
    #[must_use]
    pub fn device_path(&self) -> PathBuf {
        PathBuf::from(format!("/dev/video{}", self.index))
    }
}

impl CameraSdk for V4l2Sdk {
    type Handle = V4L2Device;

    fn is_available(&self) -> bool {
        self.device_path().exists()
    }

    fn open(&self) -> Result<V4L2Device> {
        V4L2Device::open(self.index)
    }
}

/// Return a camera handle if a Raspberry Pi compatible camera is found.
///
/// The port argument is accepted for parity with other camera backends and
/// ignored.
/// Failing to spawn the probe counts as "no camera"; errors raised while
/// opening a detected camera are returned.
pub fn find_camera<S, P>(sdk: &S, probe: &P, _port: Option<&str>) -> Result<Option<S::Handle>>
where
    S: CameraSdk,
    P: HardwareProbe,
{
    if !sdk.is_available() {
        log::debug!("camera SDK not available");
        return Ok(None);
    }

    let stdout = match probe.camera_status() {
        Ok(Some(stdout)) => stdout,
        Ok(None) => return Ok(None),
        Err(err) => {
            log::warn!("camera status query failed: {err}");
            return Ok(None);
        }
    };

    if !is_camera_detected(&stdout) {
        log::debug!(
            "no camera reported: {}",
            String::from_utf8_lossy(&stdout).trim()
        );
        return Ok(None);
    }

    log::info!("Raspberry Pi camera detected");
    sdk.open().map(Some)
}

/// [`find_camera`] with the default V4L2 device and `vcgencmd`.
pub fn get_rpi_camera_proxy(port: Option<&str>) -> Result<Option<V4L2Device>> {
    find_camera(&V4l2Sdk::default(), &Vcgencmd::default(), port)
}
