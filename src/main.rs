//! Pi-booth-cam binary: detect the camera, count down and take one picture.
//!
//! Usage: `pi-booth-cam <output.jpg> [countdown-seconds] [settings.json]`

use std::path::PathBuf;

use image::ImageFormat;
use pi_booth_cam::camera::DEFAULT_ALPHA;
use pi_booth_cam::traits::{CameraError, Result};
use pi_booth_cam::{get_rpi_camera_proxy, CameraConfig, CameraHandle, RpiCamera};

fn main() {
    pi_booth_cam::logging::init_stdout_logger();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args.next().map(PathBuf::from).ok_or_else(|| {
        CameraError::InvalidArgument(
            "usage: pi-booth-cam <output.jpg> [countdown-seconds] [settings.json]".to_owned(),
        )
    })?;
    let countdown = match args.next() {
        Some(arg) => arg
            .parse::<u32>()
            .map_err(|err| CameraError::InvalidArgument(format!("countdown '{arg}': {err}")))?,
        None => 3,
    };
    let config = match args.next() {
        Some(path) => CameraConfig::load(path)?,
        None => CameraConfig::default(),
    };

    let handle = get_rpi_camera_proxy(None)?.ok_or(CameraError::DeviceNotFound(0))?;
    let mut camera = RpiCamera::new(handle);

    println!("Device: {}", camera.handle().capabilities().card);
    camera.initialize(config)?;
    camera.preview_countdown(countdown, DEFAULT_ALPHA)?;
    camera.capture(None)?;

    for image in camera.get_captures()? {
        image.save_with_format(&output, ImageFormat::Jpeg)?;
        println!("Saved {}x{} picture to {}", image.width(), image.height(), output.display());
    }

    camera.quit()
}
