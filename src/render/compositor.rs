//! Frame compositor: background, reference axes, point dots

use crate::render::frame::{Color, RasterFrame};
use crate::render::projection::{PixelCoord, RasterSize};
use serde::{Deserialize, Serialize};

/// Colors and dot size used when composing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameStyle {
    pub background: Color,
    /// Vertical line through the origin column
    pub vertical_axis: Color,
    /// Horizontal line through the origin row
    pub horizontal_axis: Color,
    pub point: Color,
    /// Dot radius in pixels (0 = single pixel)
    pub dot_radius: u32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            vertical_axis: [255, 0, 0],
            horizontal_axis: [0, 255, 0],
            point: [255, 255, 0],
            dot_radius: 1,
        }
    }
}

/// Owns the single canvas that every render cycle redraws
pub struct FrameCompositor {
    frame: RasterFrame,
    style: FrameStyle,
    origin: i64,
}

impl FrameCompositor {
    /// Allocate the canvas once; `origin` is the pixel row/column of the sensor
    pub fn new(size: RasterSize, style: FrameStyle, origin: i64) -> Self {
        Self {
            frame: RasterFrame::new(size.width, size.height, style.background),
            style,
            origin,
        }
    }

    pub fn size(&self) -> RasterSize {
        RasterSize {
            width: self.frame.width(),
            height: self.frame.height(),
        }
    }

    pub fn style(&self) -> &FrameStyle {
        &self.style
    }

    /// Redraw the canvas for one scan and hand it back
    pub fn compose(&mut self, points: &[PixelCoord]) -> &RasterFrame {
        self.frame.clear(self.style.background);

        // Axes are drawn before the points so dots stay visible on top
        self.frame.vline(self.origin, self.style.vertical_axis);
        self.frame.hline(self.origin, self.style.horizontal_axis);

        for p in points {
            self.frame.fill_disc(
                p.x as i64,
                p.y as i64,
                self.style.dot_radius,
                self.style.point,
            );
        }

        &self.frame
    }

    /// Last composed frame
    pub fn frame(&self) -> &RasterFrame {
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0];
    const BLUE: Color = [0, 0, 255];
    const WHITE: Color = [255, 255, 255];

    fn style() -> FrameStyle {
        FrameStyle {
            background: [0, 0, 0],
            vertical_axis: RED,
            horizontal_axis: BLUE,
            point: WHITE,
            dot_radius: 1,
        }
    }

    fn compositor() -> FrameCompositor {
        FrameCompositor::new(RasterSize::square(100), style(), 50)
    }

    #[test]
    fn test_empty_scan_draws_only_axes() {
        let mut comp = compositor();
        let frame = comp.compose(&[]);
        // Horizontal line overwrites the crossing pixel
        assert_eq!(frame.count_color(RED), 99);
        assert_eq!(frame.count_color(BLUE), 100);
        assert_eq!(frame.count_color(WHITE), 0);
        assert_eq!(frame.count_color([0, 0, 0]), 100 * 100 - 199);
        assert_eq!(frame.pixel(50, 0), Some(RED));
        assert_eq!(frame.pixel(0, 50), Some(BLUE));
    }

    #[test]
    fn test_points_drawn_as_dots() {
        let mut comp = compositor();
        let frame = comp.compose(&[PixelCoord { x: 10, y: 10 }]);
        assert_eq!(frame.count_color(WHITE), 5);
        assert_eq!(frame.pixel(10, 10), Some(WHITE));
        assert_eq!(frame.pixel(11, 10), Some(WHITE));
        assert_eq!(frame.pixel(11, 11), Some([0, 0, 0]));
    }

    #[test]
    fn test_overlapping_dots_are_idempotent() {
        let mut comp = compositor();
        let once = comp.compose(&[PixelCoord { x: 20, y: 20 }]).clone();
        let twice = comp
            .compose(&[PixelCoord { x: 20, y: 20 }, PixelCoord { x: 20, y: 20 }])
            .clone();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canvas_is_cleared_between_cycles() {
        let mut comp = compositor();
        comp.compose(&[PixelCoord { x: 10, y: 10 }]);
        let frame = comp.compose(&[]);
        assert_eq!(frame.count_color(WHITE), 0);
    }

    #[test]
    fn test_dot_over_axis_wins() {
        let mut comp = compositor();
        let frame = comp.compose(&[PixelCoord { x: 50, y: 50 }]);
        assert_eq!(frame.pixel(50, 50), Some(WHITE));
    }

    #[test]
    fn test_origin_outside_canvas_skips_axes() {
        let mut comp = FrameCompositor::new(RasterSize::square(10), style(), 40);
        let frame = comp.compose(&[]);
        assert_eq!(frame.count_color([0, 0, 0]), 100);
    }
}
