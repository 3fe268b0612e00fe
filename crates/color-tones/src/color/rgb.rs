//! RGB color type
//!
//! A color is three `f32` channels in `0.0..=1.0`. Sampled pixels enter as
//! 8-bit values and are divided by 255; quantization strategies may produce
//! synthetic colors (interpolated or averaged) that never came from a byte.

/// A color with red, green and blue channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

/// Bit-exact identity of an [`Rgb`] value, usable as a hash map key.
///
/// Two colors have the same key only if every channel has the same `f32`
/// bit pattern. Keys are always derived from colors held in memory, never
/// recomputed from a different arithmetic path, so exact equality is the
/// right notion here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey([u32; 3]);

impl Rgb {
    /// Opaque black.
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Create a color from float channels.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit channels.
    ///
    /// # Example
    /// ```
    /// use color_tones::Rgb;
    /// let white = Rgb::from_u8(255, 255, 255);
    /// assert_eq!(white.g, 1.0);
    /// ```
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Convert to `[R, G, B]` bytes, rounding and clamping each channel.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Format as a lowercase `#rrggbb` hex string.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Bit-exact key for this color.
    #[inline]
    pub fn key(self) -> ColorKey {
        ColorKey([self.r.to_bits(), self.g.to_bits(), self.b.to_bits()])
    }

    /// Squared Euclidean distance in RGB.
    #[inline]
    pub fn distance_squared(self, other: Rgb) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        dr * dr + dg * dg + db * db
    }

    /// HSV hue as a fraction of a full turn, in `0.0..1.0`.
    ///
    /// Achromatic colors (all channels equal) have hue `0.0`.
    pub fn hue(self) -> f32 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        if delta <= 0.0 {
            return 0.0;
        }

        let sector = if max == self.r {
            ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };

        let hue = sector / 6.0;
        if hue >= 1.0 {
            hue - 1.0
        } else {
            hue
        }
    }

    /// Returns true if every channel is bit-identical to `other`'s.
    #[inline]
    pub fn same_bits(self, other: Rgb) -> bool {
        self.key() == other.key()
    }
}
