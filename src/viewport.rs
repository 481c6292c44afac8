//! Logical canvas to physical viewport mapping
//!
//! Gameplay runs on a fixed 1920x1080 canvas. The display may be any size:
//! the canvas is scaled uniformly to fit and centered, and the leftover strips
//! (letterbox bars) stay outside the playfield.

use glam::Vec2;

use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::error::ResolutionError;

/// Scales below this are treated as degenerate
const MIN_SCALE: f32 = 1e-6;

/// Axis-aligned rectangle in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub size: Vec2,
}

/// Uniform-scale, letterboxed mapping between logical and physical space
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    logical: Vec2,
    physical: Vec2,
    scale: f32,
    offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }
}

impl Viewport {
    /// Identity mapping for a canvas of the given logical size
    pub fn new(logical_width: f32, logical_height: f32) -> Self {
        Self {
            logical: Vec2::new(logical_width, logical_height),
            physical: Vec2::new(logical_width, logical_height),
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }

    /// Recompute the mapping for a new physical size.
    ///
    /// Zero, negative or non-finite sizes are rejected and the previous
    /// mapping stays in effect.
    pub fn set_resolution(&mut self, width: f32, height: f32) -> Result<(), ResolutionError> {
        let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !valid {
            return Err(ResolutionError { width, height });
        }

        let scale = (width / self.logical.x).min(height / self.logical.y);
        if !scale.is_finite() || scale < MIN_SCALE {
            return Err(ResolutionError { width, height });
        }

        self.physical = Vec2::new(width, height);
        self.scale = scale;
        self.offset = (self.physical - self.logical * scale) / 2.0;
        Ok(())
    }

    /// Logical point to physical pixels
    #[inline]
    pub fn to_physical(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    /// Physical pixels to logical point
    #[inline]
    pub fn to_logical(&self, p: Vec2) -> Vec2 {
        (p - self.offset) / self.scale
    }

    /// Scale a logical length to physical pixels
    #[inline]
    pub fn scale_value(&self, value: f32) -> f32 {
        value * self.scale
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn physical_size(&self) -> Vec2 {
        self.physical
    }

    pub fn logical_size(&self) -> Vec2 {
        self.logical
    }

    /// Physical rectangle covered by the logical canvas
    pub fn canvas_rect(&self) -> ScreenRect {
        ScreenRect {
            min: self.offset,
            size: self.logical * self.scale,
        }
    }

    /// True when a physical point lands on the canvas (not on a bar)
    pub fn contains_physical(&self, p: Vec2) -> bool {
        let canvas = self.canvas_rect();
        let max = canvas.min + canvas.size;
        p.x >= canvas.min.x && p.y >= canvas.min.y && p.x <= max.x && p.y <= max.y
    }

    /// Letterbox bars (zero, or two strips on opposite sides)
    pub fn letterbox_bars(&self) -> Vec<ScreenRect> {
        let canvas = self.canvas_rect();
        let mut bars = Vec::with_capacity(2);

        if self.offset.x > 0.0 {
            let size = Vec2::new(self.offset.x, self.physical.y);
            bars.push(ScreenRect { min: Vec2::ZERO, size });
            bars.push(ScreenRect {
                min: Vec2::new(canvas.min.x + canvas.size.x, 0.0),
                size,
            });
        } else if self.offset.y > 0.0 {
            let size = Vec2::new(self.physical.x, self.offset.y);
            bars.push(ScreenRect { min: Vec2::ZERO, size });
            bars.push(ScreenRect {
                min: Vec2::new(0.0, canvas.min.y + canvas.size.y),
                size,
            });
        }

        bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_matching_aspect_has_no_bars() {
        let mut vp = Viewport::default();
        vp.set_resolution(3840.0, 2160.0).unwrap();
        assert!((vp.scale() - 2.0).abs() < 1e-6);
        assert_eq!(vp.offset(), Vec2::ZERO);
        assert!(vp.letterbox_bars().is_empty());
    }

    #[test]
    fn test_wide_display_pillarboxes() {
        let mut vp = Viewport::default();
        // 21:9 ultrawide: height limits the scale
        vp.set_resolution(2560.0, 1080.0).unwrap();
        assert!((vp.scale() - 1.0).abs() < 1e-6);
        assert!((vp.offset().x - 320.0).abs() < 1e-4);
        assert_eq!(vp.offset().y, 0.0);

        let bars = vp.letterbox_bars();
        assert_eq!(bars.len(), 2);
        assert!((bars[0].size.x - 320.0).abs() < 1e-4);
        assert!((bars[1].min.x - 2240.0).abs() < 1e-3);
    }

    #[test]
    fn test_tall_display_letterboxes() {
        let mut vp = Viewport::default();
        vp.set_resolution(1080.0, 1920.0).unwrap();
        let canvas = vp.canvas_rect();
        // Whole canvas stays visible
        assert!(canvas.size.x <= 1080.0 + 1e-3);
        assert!(canvas.size.y <= 1920.0 + 1e-3);
        assert!(vp.offset().y > 0.0);
        assert_eq!(vp.offset().x, 0.0);
    }

    #[test]
    fn test_invalid_resolution_keeps_previous_mapping() {
        let mut vp = Viewport::default();
        vp.set_resolution(1280.0, 720.0).unwrap();
        let before = vp.clone();

        assert!(vp.set_resolution(0.0, 720.0).is_err());
        assert!(vp.set_resolution(1280.0, -1.0).is_err());
        assert!(vp.set_resolution(f32::NAN, 720.0).is_err());
        assert!(vp.set_resolution(f32::INFINITY, 720.0).is_err());
        assert_eq!(vp, before);
    }

    #[test]
    fn test_canvas_corners_map_inside_physical() {
        let mut vp = Viewport::default();
        vp.set_resolution(1000.0, 1000.0).unwrap();
        let top_left = vp.to_physical(Vec2::ZERO);
        let bottom_right = vp.to_physical(Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT));
        assert!(top_left.x >= -1e-3 && top_left.y >= -1e-3);
        assert!(bottom_right.x <= 1000.0 + 1e-3 && bottom_right.y <= 1000.0 + 1e-3);
        assert!(vp.contains_physical(Vec2::new(500.0, 500.0)));
        assert!(!vp.contains_physical(Vec2::new(500.0, 10.0)));
    }

    proptest! {
        #[test]
        fn prop_round_trip_inside_viewport(
            w in 64.0f32..7680.0,
            h in 64.0f32..4320.0,
            fx in 0.0f32..1.0,
            fy in 0.0f32..1.0,
        ) {
            let mut vp = Viewport::default();
            vp.set_resolution(w, h).unwrap();
            let p = Vec2::new(fx * w, fy * h);
            let back = vp.to_physical(vp.to_logical(p));
            let tol = 1e-4 * w.max(h) + 1e-3;
            prop_assert!((back - p).length() <= tol, "{p:?} -> {back:?}");
        }

        #[test]
        fn prop_canvas_never_clipped(w in 1.0f32..8000.0, h in 1.0f32..8000.0) {
            let mut vp = Viewport::default();
            vp.set_resolution(w, h).unwrap();
            let canvas = vp.canvas_rect();
            prop_assert!(canvas.min.x >= -1e-3 && canvas.min.y >= -1e-3);
            prop_assert!(canvas.min.x + canvas.size.x <= w * (1.0 + 1e-5) + 1e-3);
            prop_assert!(canvas.min.y + canvas.size.y <= h * (1.0 + 1e-5) + 1e-3);
        }
    }
}
