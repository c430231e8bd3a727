//! Raspberry Pi camera adapter.
//!
//! [`RpiCamera`] implements the photobooth camera lifecycle on top of a
//! [`CameraHandle`]: initialize, preview, countdown, capture and quit.
//! Transitions are linear and driven by the caller:
//! configured, then streaming, then stopped by [`RpiCamera::quit`].

use std::io::Cursor;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::config::{CameraConfig, Rotation};
use crate::language::{Catalog, Translator};
use crate::overlay::{NoOverlay, Overlay};
use crate::preview::{new_size_keep_aspect_ratio, PreviewWindow, Rect, Size};
use crate::timing::{Sleeper, ThreadSleeper};
use crate::traits::{CameraError, CameraHandle, Format, Result};

/// Default overlay opacity.
pub const DEFAULT_ALPHA: u8 = 60;

/// Photobooth camera backed by a Raspberry Pi camera handle.
pub struct RpiCamera<C: CameraHandle> {
    cam: C,
    config: CameraConfig,
    format: Option<Format>,
    window: Option<PreviewWindow>,
    previewing: bool,
    captures: Vec<Vec<u8>>,
    overlay: Box<dyn Overlay>,
    sleeper: Box<dyn Sleeper>,
    translator: Box<dyn Translator>,
}

impl<C: CameraHandle> std::fmt::Debug for RpiCamera<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiCamera")
            .field("card", &self.cam.capabilities().card)
            .field("config", &self.config)
            .field("format", &self.format)
            .field("window", &self.window)
            .field("captures", &self.captures.len())
            .finish_non_exhaustive()
    }
}

impl<C: CameraHandle> RpiCamera<C> {
    /// Named image effects the camera can apply. The SDK exposes raw
    /// controls only, so there are none.
    pub const IMAGE_EFFECTS: &'static [&'static str] = &[];

    /// Wrap an opened camera handle.
    pub fn new(cam: C) -> Self {
        Self {
            cam,
            config: CameraConfig::default(),
            format: None,
            window: None,
            previewing: false,
            captures: Vec::new(),
            overlay: Box::new(NoOverlay),
            sleeper: Box::new(ThreadSleeper),
            translator: Box::new(Catalog::default()),
        }
    }

    /// Draw countdown and prompts with `overlay`.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.overlay = overlay;
        self
    }

    /// Block with `sleeper` during countdown and wait.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Translate prompts with `translator`.
    #[must_use]
    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Whether `preview` honours its `flip` argument.
    pub const fn supports_preview_flip() -> bool {
        false
    }

    /// Whether the overlay can display text on top of the preview.
    pub fn supports_overlay(&self) -> bool {
        self.overlay.is_supported()
    }

    /// Current settings.
    pub const fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Format negotiated on initialization.
    pub const fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    /// The wrapped camera handle.
    pub const fn handle(&self) -> &C {
        &self.cam
    }

    /// Apply `config` and start streaming.
    pub fn initialize(&mut self, config: CameraConfig) -> Result<()> {
        config.validate()?;
        if config.preview_rotation() != Rotation::None {
            log::warn!("preview rotation is not supported by this camera, ignoring it");
        }
        if config.preview_flip() && !Self::supports_preview_flip() {
            log::warn!("preview flip is not supported by this camera, ignoring it");
        }
        self.config = config;

        let still = self.config.still_configuration();
        log::debug!("configuring still capture {still:?}");
        let format = self.cam.configure(&still)?;
        self.cam.set_controls(self.config.controls())?;
        self.cam.start()?;

        log::info!(
            "camera '{}' streaming {}x{} {:?}",
            self.cam.capabilities().card,
            format.width,
            format.height,
            format.fourcc
        );
        self.format = Some(format);
        Ok(())
    }

    /// Area of the preview window where the camera picture is displayed.
    ///
    /// The rectangle keeps the capture aspect ratio, stays `border` pixels
    /// inside the window and, when given, no larger than `max_size`.
    pub fn get_rect(&self, max_size: Option<Size>) -> Option<Rect> {
        let window = self.window?;
        let border = self.config.border().saturating_mul(2);
        let mut size = Size::new(
            window.rect.width.saturating_sub(border),
            window.rect.height.saturating_sub(border),
        );
        if let Some(max) = max_size {
            size = Size::new(size.width.min(max.width), size.height.min(max.height));
        }

        let res = new_size_keep_aspect_ratio(self.config.resolution().into(), size);
        Some(window.rect.centered(res))
    }

    /// Display the live preview in `window`.
    pub fn preview(&mut self, window: PreviewWindow, flip: bool) -> Result<()> {
        if flip && !Self::supports_preview_flip() {
            log::warn!("preview flip is not supported by this camera, ignoring it");
        }
        self.window = Some(window);

        if self.cam.supports_preview() {
            self.cam.start_preview()?;
            self.previewing = true;
        } else {
            log::info!("camera has no preview window, preview not displayed");
        }
        Ok(())
    }

    /// Count down from `timeout` seconds, then prompt the guests to smile.
    pub fn preview_countdown(&mut self, timeout: u32, alpha: u8) -> Result<()> {
        if timeout < 1 {
            return Err(CameraError::InvalidArgument(
                "Start time shall be greater than 0".to_owned(),
            ));
        }

        for remaining in (1..=timeout).rev() {
            self.overlay.show(&remaining.to_string(), alpha)?;
            self.sleeper.sleep(Duration::from_secs(1));
            self.overlay.hide()?;
        }
        self.show_smile(alpha)
    }

    /// Wait `timeout`, then prompt the guests to smile.
    pub fn preview_wait(&mut self, timeout: Duration, alpha: u8) -> Result<()> {
        self.sleeper.sleep(timeout);
        self.show_smile(alpha)
    }

    fn show_smile(&mut self, alpha: u8) -> Result<()> {
        let text = self.translator.translate("smile");
        self.overlay.show(&text, alpha)
    }

    /// Stop the live preview.
    pub fn stop_preview(&mut self) -> Result<()> {
        if self.previewing {
            self.cam.stop_preview()?;
            self.previewing = false;
        }
        self.window = None;
        Ok(())
    }

    /// Capture a picture and store it as JPEG in the capture list.
    ///
    /// Named effects have no equivalent in the SDK: any effect other than
    /// `none` is reported and ignored.
    pub fn capture(&mut self, effect: Option<&str>) -> Result<()> {
        if let Some(effect) = effect.filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("none")) {
            if !Self::IMAGE_EFFECTS.contains(&effect) {
                log::warn!("image effect '{effect}' is not supported by this camera, ignoring it");
            }
        }

        let format = self.format.as_ref().ok_or(CameraError::NotStarted)?;
        let frame = self.cam.capture_array()?;
        let image = frame.to_rgb_image(format)?;

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality())
            .encode_image(&image)?;
        log::debug!(
            "captured frame {} ({} bytes JPEG)",
            frame.metadata.sequence,
            buffer.len()
        );

        self.captures.push(buffer);
        self.overlay.hide()
    }

    /// JPEG buffers captured so far.
    pub fn captures(&self) -> &[Vec<u8>] {
        &self.captures
    }

    /// Forget all captured pictures.
    pub fn drop_captures(&mut self) {
        self.captures.clear();
    }

    /// Decode every capture, apply the capture rotation and clear the list.
    pub fn get_captures(&mut self) -> Result<Vec<DynamicImage>> {
        let images = self
            .captures
            .iter()
            .map(|data| self.post_process_capture(data))
            .collect::<Result<Vec<_>>>()?;
        self.drop_captures();
        Ok(images)
    }

    fn post_process_capture(&self, data: &[u8]) -> Result<DynamicImage> {
        let image = image::load(Cursor::new(data), ImageFormat::Jpeg)?;
        Ok(match self.config.capture_rotation() {
            Rotation::None => image,
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        })
    }

    /// Stop streaming and release the camera.
    pub fn quit(mut self) -> Result<()> {
        if self.previewing {
            self.cam.stop_preview()?;
        }
        self.cam.stop()?;
        log::info!("closing camera '{}'", self.cam.capabilities().card);
        self.cam.close()
    }
}
