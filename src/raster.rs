//! Packed RGB pixel buffer and the drawing surface the engines write to.

use crate::error::{FractalError, Result};

/// RGB colour triple.
pub type Rgb = (u8, u8, u8);

/// Background used when clearing a canvas (dark violet).
pub const BACKGROUND: Rgb = (14, 11, 22);

/// Parse a `#rrggbb` colour. The leading `#` is optional.
pub fn parse_hex(text: &str) -> Result<Rgb> {
    let hex = text.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(FractalError::InvalidColor(text.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| FractalError::InvalidColor(text.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Drawing primitives the engines need. Coordinates are in pixels with
/// (0, 0) at the top-left; writes outside the surface are dropped.
pub trait Surface {
    fn size(&self) -> (usize, usize);

    /// Fill the 1×1 pixel containing `(x, y)`.
    fn plot(&mut self, x: f64, y: f64, color: Rgb);

    /// Stroke a straight line from `from` to `to`.
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.plot(from.0 + dx * t, from.1 + dy * t, color);
        }
    }

    /// Stroke a circle outline.
    fn circle(&mut self, center: (f64, f64), radius: f64, color: Rgb) {
        let samples = ((std::f64::consts::TAU * radius).ceil() as usize).max(8);
        for i in 0..samples {
            let a = i as f64 / samples as f64 * std::f64::consts::TAU;
            self.plot(center.0 + radius * a.cos(), center.1 + radius * a.sin(), color);
        }
    }
}

/// Width × height RGB buffer, three bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        let mut raster = Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        };
        raster.fill(BACKGROUND);
        raster
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(3) {
            px[0] = color.0;
            px[1] = color.1;
            px[2] = color.2;
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            self.pixels[idx] = color.0;
            self.pixels[idx + 1] = color.1;
            self.pixels[idx + 2] = color.2;
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            Some((self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]))
        } else {
            None
        }
    }

    /// Copy `src` onto this raster, top-left aligned. Only the overlapping
    /// region is copied when the sizes differ.
    pub fn blit(&mut self, src: &Raster) {
        if src.width == self.width && src.height == self.height {
            self.pixels.copy_from_slice(&src.pixels);
            return;
        }
        let w = self.width.min(src.width);
        for y in 0..self.height.min(src.height) {
            let dst = y * self.width * 3;
            let from = y * src.width * 3;
            self.pixels[dst..dst + w * 3].copy_from_slice(&src.pixels[from..from + w * 3]);
        }
    }
}

impl Surface for Raster {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn plot(&mut self, x: f64, y: f64, color: Rgb) {
        if x >= 0.0 && y >= 0.0 && x.is_finite() && y.is_finite() {
            self.set(x as usize, y as usize, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_raster_is_background() {
        let r = Raster::new(4, 3);
        assert_eq!(r.as_bytes().len(), 36);
        assert_eq!(r.get(3, 2), Some(BACKGROUND));
        assert_eq!(r.get(4, 0), None);
    }

    #[test]
    fn plot_ignores_out_of_bounds() {
        let mut r = Raster::new(2, 2);
        r.plot(-0.5, 0.0, (255, 0, 0));
        r.plot(2.0, 1.0, (255, 0, 0));
        r.plot(f64::NAN, 1.0, (255, 0, 0));
        r.plot(1.7, 0.2, (1, 2, 3));
        assert_eq!(r.get(1, 0), Some((1, 2, 3)));
        assert_eq!(r.get(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut r = Raster::new(10, 10);
        r.line((1.0, 1.0), (8.0, 5.0), (9, 9, 9));
        assert_eq!(r.get(1, 1), Some((9, 9, 9)));
        assert_eq!(r.get(8, 5), Some((9, 9, 9)));
    }

    #[test]
    fn hex_colours_parse_with_or_without_hash() {
        assert_eq!(parse_hex("#ffae00"), Ok((255, 174, 0)));
        assert_eq!(parse_hex("FF00ff"), Ok((255, 0, 255)));
        assert!(matches!(parse_hex("#ff00"), Err(FractalError::InvalidColor(_))));
        assert!(matches!(parse_hex("#gg0000"), Err(FractalError::InvalidColor(_))));
    }

    #[test]
    fn blit_copies_overlap_only() {
        let mut big = Raster::new(4, 4);
        let mut small = Raster::new(2, 2);
        small.fill((7, 7, 7));
        big.blit(&small);
        assert_eq!(big.get(1, 1), Some((7, 7, 7)));
        assert_eq!(big.get(2, 2), Some(BACKGROUND));
    }
}
