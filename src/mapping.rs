//! Numeric helpers: linear range remapping and reflected oscillation.

/// Map `input` from `[input_min, input_max]` onto `[output_min, output_max]`.
///
/// The mapping is affine and is not clamped, so inputs outside the source
/// range land outside the target range.
#[inline]
pub fn map(input: f64, input_min: f64, input_max: f64, output_min: f64, output_max: f64) -> f64 {
    let normalized = (input - input_min) / (input_max - input_min);
    output_min + normalized * (output_max - output_min)
}

/// An RGB triple that walks each channel by its own delta and reflects at
/// 0 and 255. Used for the spirograph rainbow trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCycle {
    pub rgb: [i32; 3],
    pub delta: [i32; 3],
}

impl ColorCycle {
    pub fn new(rgb: (u8, u8, u8), delta: [i32; 3]) -> Self {
        Self {
            rgb: [rgb.0 as i32, rgb.1 as i32, rgb.2 as i32],
            delta,
        }
    }

    /// Advance one tick.
    pub fn advance(&mut self) {
        for i in 0..3 {
            self.rgb[i] += self.delta[i];
            if self.rgb[i] > 255 {
                self.rgb[i] = 255;
                self.delta[i] = -self.delta[i].abs();
            } else if self.rgb[i] < 0 {
                self.rgb[i] = 0;
                self.delta[i] = self.delta[i].abs();
            }
        }
    }

    pub fn color(&self) -> (u8, u8, u8) {
        (
            self.rgb[0].clamp(0, 255) as u8,
            self.rgb[1].clamp(0, 255) as u8,
            self.rgb[2].clamp(0, 255) as u8,
        )
    }
}
