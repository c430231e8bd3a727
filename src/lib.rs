//! Pi-Booth-Cam: Raspberry Pi camera backend for photobooth applications
//!
//! This library detects a Raspberry Pi camera module, configures it for still
//! capture and exposes the photobooth camera lifecycle (preview, countdown,
//! capture, quit) over a trait-based camera handle, enabling both production
//! use with real hardware and testing with mock devices.

pub mod camera;
pub mod config;
pub mod detect;
pub mod device;
pub mod language;
pub mod logging;
pub mod overlay;
pub mod preview;
pub mod timing;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub mod mock;

pub use camera::RpiCamera;
pub use config::{AwbMode, CameraConfig, Controls, Resolution, Rotation, StillConfiguration};
pub use detect::{find_camera, get_rpi_camera_proxy, CameraSdk, HardwareProbe, V4l2Sdk, Vcgencmd};
pub use device::V4L2Device;
pub use language::{Catalog, Translator};
pub use overlay::{NoOverlay, Overlay};
pub use preview::{PreviewWindow, Rect, Size};
pub use timing::{Sleeper, ThreadSleeper};
pub use traits::{
    CameraError, CameraHandle, DeviceCapabilities, Format, FourCC, Frame, FrameMetadata,
};
