use crate::geometry::FloatType;

/// Linear color with channels in the 0-1 range
pub type Rgb = rgb::RGB<FloatType>;

pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

/// Maps a 0-1 float color to 8 bit channels, rounding and clamping.
pub fn color_to_bytes(color: Rgb) -> [u8; 3] {
    [color.r, color.g, color.b].map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
}
