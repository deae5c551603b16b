//! Presentation parameters of the invoice surface and the guard that restores them after export.

use crate::session::DisplayMode;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use tracing::debug;

/// The width of an A4 page in CSS pixels at 96 DPI.
pub const A4_WIDTH_PX: u32 = 794;

/// Padding around the invoice content, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(px: u32) -> Self {
        Self::new(px, px, px, px)
    }
}

/// How the invoice surface is laid out.
///
/// Each display mode has a canonical layout; export temporarily applies `Layout::print`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Layout {
    /// Whether the visible panel is centered in the window.
    pub centered: bool,
    /// A fixed content width, or `None` to fill the available width.
    pub width_px: Option<u32>,
    /// The margin between the window edge and the content.
    pub body_margin_px: u32,
    /// The padding inside the invoice region.
    pub padding: Padding,
}

impl Layout {
    /// The centered form layout.
    pub fn editing() -> Self {
        Self {
            centered: true,
            width_px: None,
            body_margin_px: 8,
            padding: Padding::all(32),
        }
    }

    /// The full-width preview layout.
    pub fn previewing() -> Self {
        Self {
            centered: false,
            width_px: None,
            body_margin_px: 8,
            padding: Padding::all(32),
        }
    }

    /// An A4-wide invoice with no body margin. Used only while rendering.
    pub fn print() -> Self {
        Self {
            centered: false,
            width_px: Some(A4_WIDTH_PX),
            body_margin_px: 0,
            padding: Padding::new(0, 20, 20, 20),
        }
    }

    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Editing => Self::editing(),
            DisplayMode::Previewing => Self::previewing(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::editing()
    }
}

/// Applies a temporary layout and puts the original back when dropped.
///
/// Restoration happens on every exit path: normal return, an early `?` return, and the enclosing
/// future being dropped before it completes.
pub(crate) struct LayoutGuard<'a> {
    layout: &'a mut Layout,
    original: Layout,
}

impl<'a> LayoutGuard<'a> {
    pub(crate) fn apply(layout: &'a mut Layout, temporary: Layout) -> Self {
        let original = std::mem::replace(layout, temporary);
        debug!("Applied temporary layout {:?}", layout);
        Self { layout, original }
    }
}

impl Deref for LayoutGuard<'_> {
    type Target = Layout;

    fn deref(&self) -> &Self::Target {
        &*self.layout
    }
}

impl Drop for LayoutGuard<'_> {
    fn drop(&mut self) {
        *self.layout = self.original.clone();
        debug!("Restored layout {:?}", self.layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_on_drop() {
        let mut layout = Layout::previewing();
        {
            let guard = LayoutGuard::apply(&mut layout, Layout::print());
            assert_eq!(guard.width_px, Some(A4_WIDTH_PX));
            assert_eq!(guard.body_margin_px, 0);
        }
        assert_eq!(layout, Layout::previewing());
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn fails(layout: &mut Layout) -> Result<(), &'static str> {
            let _guard = LayoutGuard::apply(layout, Layout::print());
            Err("renderer exploded")
        }
        let mut layout = Layout::editing();
        assert!(fails(&mut layout).is_err());
        assert_eq!(layout, Layout::editing());
    }

    #[test]
    fn test_modes_have_distinct_layouts() {
        assert!(Layout::for_mode(DisplayMode::Editing).centered);
        assert!(!Layout::for_mode(DisplayMode::Previewing).centered);
    }
}
