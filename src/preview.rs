//! Preview window geometry.

use crate::config::Resolution;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for Size {
    fn from(res: Resolution) -> Self {
        Self::new(res.width, res.height)
    }
}

/// Screen rectangle, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(half(self.width)),
            self.y.saturating_add(half(self.height)),
        )
    }

    /// Rectangle of `size` centered on this one.
    #[must_use]
    pub fn centered(&self, size: Size) -> Self {
        let (cx, cy) = self.center();
        Self::new(
            cx.saturating_sub(half(size.width)),
            cy.saturating_sub(half(size.height)),
            size.width,
            size.height,
        )
    }
}

fn half(value: u32) -> i32 {
    i32::try_from(value / 2).unwrap_or(i32::MAX)
}

/// Host window the preview is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewWindow {
    /// Absolute position of the window on screen.
    pub rect: Rect,
}

impl PreviewWindow {
    /// Create a window handle covering `rect`.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

/// Largest size with the aspect ratio of `original` fitting inside `target`.
#[must_use]
pub fn new_size_keep_aspect_ratio(original: Size, target: Size) -> Size {
    if original.width == 0 || original.height == 0 {
        return Size::new(0, 0);
    }

    let (ow, oh) = (u64::from(original.width), u64::from(original.height));
    let (tw, th) = (u64::from(target.width), u64::from(target.height));

    // Compare tw/ow against th/oh without floating point.
    let (width, height) = if tw * oh <= th * ow {
        (tw, oh * tw / ow)
    } else {
        (ow * th / oh, th)
    };

    Size::new(
        u32::try_from(width).unwrap_or(u32::MAX),
        u32::try_from(height).unwrap_or(u32::MAX),
    )
}
