//! Overlay capability drawn on top of the live preview.
//!
//! Rendering text over the preview belongs to the host application (GUI or
//! compositing layer). The adapter only calls into this trait, and the
//! default implementation does nothing.

use crate::traits::Result;

/// Text overlay rendered atop the live preview.
pub trait Overlay {
    /// Show `text` with the given opacity (0 transparent, 255 opaque).
    fn show(&mut self, text: &str, alpha: u8) -> Result<()>;

    /// Remove any overlay currently shown.
    fn hide(&mut self) -> Result<()>;

    /// Whether this overlay actually renders anything.
    fn is_supported(&self) -> bool {
        true
    }
}

/// Overlay that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn show(&mut self, text: &str, alpha: u8) -> Result<()> {
        log::debug!("overlay not supported, dropping '{text}' (alpha {alpha})");
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_supported(&self) -> bool {
        false
    }
}
