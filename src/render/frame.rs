//! Fixed-size RGB raster reused across render cycles

use image::{Rgb, RgbImage};

/// 8-bit RGB color
pub type Color = [u8; 3];

/// Fixed-size pixel canvas
///
/// Backed by an [`RgbImage`] allocated once; every drawing call writes in
/// place and silently clips at the borders.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFrame {
    image: RgbImage,
}

impl RasterFrame {
    /// Allocate a `width x height` frame filled with `background`
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Overwrite every pixel with `color`
    pub fn clear(&mut self, color: Color) {
        for px in self.image.pixels_mut() {
            *px = Rgb(color);
        }
    }

    /// Read one pixel; `None` outside the canvas
    pub fn pixel(&self, x: i64, y: i64) -> Option<Color> {
        self.in_bounds(x, y)
            .then(|| self.image.get_pixel(x as u32, y as u32).0)
    }

    /// Write one pixel, ignoring coordinates outside the canvas
    #[inline]
    pub fn set(&mut self, x: i64, y: i64, color: Color) {
        if self.in_bounds(x, y) {
            self.image.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }

    /// Full-width line at row `y`
    pub fn hline(&mut self, y: i64, color: Color) {
        if y < 0 || y >= self.height() as i64 {
            return;
        }
        for x in 0..self.width() {
            self.image.put_pixel(x, y as u32, Rgb(color));
        }
    }

    /// Full-height line at column `x`
    pub fn vline(&mut self, x: i64, color: Color) {
        if x < 0 || x >= self.width() as i64 {
            return;
        }
        for y in 0..self.height() {
            self.image.put_pixel(x as u32, y, Rgb(color));
        }
    }

    /// Filled disc of `radius` pixels around (cx, cy); radius 0 is a single pixel
    pub fn fill_disc(&mut self, cx: i64, cy: i64, radius: u32, color: Color) {
        let r = radius as i64;
        let r2 = r * r;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r2 {
                    self.set(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Number of pixels currently holding `color`
    pub fn count_color(&self, color: Color) -> usize {
        self.image.pixels().filter(|p| p.0 == color).count()
    }

    /// Borrow the backing image (for encoders and display backends)
    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    #[inline]
    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }
}
