/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// This is the value uploaded verbatim into the fragment stage's color
/// uniform, so the channel order matches the shader's `vec4<f32>`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const RED: Self = Self::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::rgba(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    /// Channel array in shader order (`r, g, b, a`).
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Clamps all channels to `[0, 1]`. Non-finite channels become `0`.
    #[inline]
    pub fn clamped(self) -> Self {
        fn c(v: f32) -> f32 {
            if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
        }
        Self { r: c(self.r), g: c(self.g), b: c(self.b), a: c(self.a) }
    }

    /// Quantizes to 8-bit unorm channels, as stored by an `Rgba8Unorm` target.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v * 255.0).round() as u8;
        let c = self.clamped();
        [q(c.r), q(c.g), q(c.b), q(c.a)]
    }

    #[inline]
    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl From<[f32; 4]> for Color {
    fn from(v: [f32; 4]) -> Self {
        Self::from_array(v)
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_are_opaque() {
        for c in [Color::RED, Color::GREEN, Color::BLUE, Color::BLACK] {
            assert_eq!(c.a, 1.0);
        }
    }

    #[test]
    fn array_order_is_rgba() {
        assert_eq!(Color::GREEN.to_array(), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(Color::from([0.25, 0.5, 0.75, 1.0]), Color::rgba(0.25, 0.5, 0.75, 1.0));
    }

    #[test]
    fn clamped_limits_range_and_drops_nan() {
        let c = Color::rgba(1.5, -0.5, f32::NAN, 0.5).clamped();
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 0.5));
        assert!(c.is_finite());
    }

    #[test]
    fn rgba8_quantization() {
        assert_eq!(Color::RED.to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(Color::BLACK.to_rgba8(), [0, 0, 0, 255]);
        assert_eq!(Color::rgba(0.5, 0.5, 0.5, 1.0).to_rgba8(), [128, 128, 128, 255]);
    }
}
