//! Minimal color spaces for color models.
//!
//! Only the spaces color models here need: sRGB, linear RGB, linear gray
//! and CIE XYZ (D50, the usual profile connection space). Conversions go
//! through linear sRGB primaries using the Bradford-adapted D50 matrices.

/// Maximum XYZ component value (`1 + 32767/32768`).
pub const XYZ_MAX: f32 = 1.0 + 32767.0 / 32768.0;

const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.436_074_7, 0.385_064_9, 0.143_080_4],
    [0.222_504_5, 0.716_878_6, 0.060_616_9],
    [0.013_932_2, 0.097_104_5, 0.714_173_3],
];

const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.133_856_1, -1.616_866_7, -0.490_614_6],
    [-0.978_768_4, 1.916_141_5, 0.033_454_0],
    [0.071_945_3, -0.228_991_4, 1.405_242_7],
];

/// Family a color space belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpaceType {
    Rgb,
    Gray,
    Xyz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    #[default]
    Srgb,
    LinearRgb,
    LinearGray,
    CieXyz,
}

/// sRGB transfer curve, encoded to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear to sRGB-encoded.
pub fn linear_to_srgb(l: f32) -> f32 {
    if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

fn mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn clamp01(v: [f32; 3]) -> [f32; 3] {
    v.map(|c| c.clamp(0.0, 1.0))
}

impl ColorSpace {
    pub fn space_type(self) -> ColorSpaceType {
        match self {
            ColorSpace::Srgb | ColorSpace::LinearRgb => ColorSpaceType::Rgb,
            ColorSpace::LinearGray => ColorSpaceType::Gray,
            ColorSpace::CieXyz => ColorSpaceType::Xyz,
        }
    }

    pub fn num_components(self) -> usize {
        match self {
            ColorSpace::LinearGray => 1,
            _ => 3,
        }
    }

    pub fn min_value(self, _component: usize) -> f32 {
        0.0
    }

    pub fn max_value(self, _component: usize) -> f32 {
        match self {
            ColorSpace::CieXyz => XYZ_MAX,
            _ => 1.0,
        }
    }

    /// `true` when every component ranges over exactly `[0, 1]`.
    pub fn is_unit_range(self) -> bool {
        (0..self.num_components()).all(|c| self.min_value(c) == 0.0 && self.max_value(c) == 1.0)
    }

    pub fn is_srgb(self) -> bool {
        self == ColorSpace::Srgb
    }

    /// Components in this space to linear sRGB primaries.
    fn to_linear_rgb(self, c: &[f32]) -> [f32; 3] {
        match self {
            ColorSpace::Srgb => [c[0], c[1], c[2]].map(srgb_to_linear),
            ColorSpace::LinearRgb => [c[0], c[1], c[2]],
            ColorSpace::LinearGray => [c[0]; 3],
            ColorSpace::CieXyz => mul(&XYZ_TO_RGB, [c[0], c[1], c[2]]),
        }
    }

    fn from_linear_rgb(self, l: [f32; 3]) -> Vec<f32> {
        match self {
            ColorSpace::Srgb => clamp01(l).map(linear_to_srgb).to_vec(),
            ColorSpace::LinearRgb => clamp01(l).to_vec(),
            ColorSpace::LinearGray => vec![mul(&RGB_TO_XYZ, clamp01(l))[1].clamp(0.0, 1.0)],
            ColorSpace::CieXyz => mul(&RGB_TO_XYZ, clamp01(l))
                .map(|v| v.clamp(0.0, XYZ_MAX))
                .to_vec(),
        }
    }

    /// Convert `components` (at least [`num_components`](Self::num_components)
    /// values) to sRGB in `[0, 1]`.
    pub fn to_rgb(self, components: &[f32]) -> [f32; 3] {
        match self {
            ColorSpace::Srgb => clamp01([components[0], components[1], components[2]]),
            other => clamp01(other.to_linear_rgb(components)).map(linear_to_srgb),
        }
    }

    /// Convert sRGB in `[0, 1]` to components of this space.
    pub fn from_rgb(self, rgb: [f32; 3]) -> Vec<f32> {
        match self {
            ColorSpace::Srgb => clamp01(rgb).to_vec(),
            other => other.from_linear_rgb(rgb.map(srgb_to_linear)),
        }
    }

    /// Convert `components` to CIE XYZ (D50).
    pub fn to_ciexyz(self, components: &[f32]) -> [f32; 3] {
        match self {
            ColorSpace::CieXyz => [components[0], components[1], components[2]],
            other => mul(&RGB_TO_XYZ, other.to_linear_rgb(components)),
        }
    }

    pub fn from_ciexyz(self, xyz: [f32; 3]) -> Vec<f32> {
        match self {
            ColorSpace::CieXyz => xyz.to_vec(),
            other => other.from_linear_rgb(mul(&XYZ_TO_RGB, xyz)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_ranges() {
        assert!(ColorSpace::Srgb.is_unit_range());
        assert!(ColorSpace::LinearGray.is_unit_range());
        assert!(!ColorSpace::CieXyz.is_unit_range());
        assert_eq!(ColorSpace::CieXyz.max_value(1), XYZ_MAX);
        assert_eq!(ColorSpace::LinearGray.num_components(), 1);
        assert_eq!(ColorSpace::LinearRgb.space_type(), ColorSpaceType::Rgb);
    }

    #[test]
    fn test_transfer_curve() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < EPS);
        for &v in &[0.01_f32, 0.2, 0.5, 0.9] {
            assert!((linear_to_srgb(srgb_to_linear(v)) - v).abs() < 1e-5);
        }
    }

    #[test]
    fn test_white_maps_to_d50() {
        let xyz = ColorSpace::Srgb.to_ciexyz(&[1.0, 1.0, 1.0]);
        assert!((xyz[0] - 0.9642).abs() < EPS);
        assert!((xyz[1] - 1.0).abs() < EPS);
        assert!((xyz[2] - 0.8249).abs() < EPS);
        let back = ColorSpace::CieXyz.to_rgb(&xyz);
        for c in back {
            assert!((c - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_gray_round_trip() {
        let rgb = ColorSpace::LinearGray.to_rgb(&[0.214]);
        assert!((rgb[0] - 0.5).abs() < EPS);
        assert!((rgb[0] - rgb[2]).abs() < 1e-6);
        let g = ColorSpace::LinearGray.from_rgb(rgb);
        assert!((g[0] - 0.214).abs() < EPS);
    }
}
