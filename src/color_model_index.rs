//! Palette (indexed) color model.
//!
//! Pixels are indices into a table of up to `1 << bits` ARGB colors. The
//! model's transparency is derived from the alpha values actually present
//! in the table.

use crate::color_model::{check_raster_dims, ColorModel, ColorModelBase, Transparency};
use crate::color_space::ColorSpace;
use crate::data_buffer::{DataType, TransferData};
use crate::error::{Error, Result};
use crate::sample_model::{ComponentSampleModel, MultiPixelPackedSampleModel, SampleModel};

#[derive(Debug, Clone, PartialEq)]
pub struct IndexColorModel {
    base: ColorModelBase,
    palette: Vec<u32>,
    transparent_pixel: Option<usize>,
}

fn classify(palette: &[u32]) -> Transparency {
    let mut t = Transparency::Opaque;
    for &c in palette {
        match c >> 24 {
            0xff => {}
            0 => t = Transparency::Bitmask,
            _ => return Transparency::Translucent,
        }
    }
    t
}

impl IndexColorModel {
    /// Palette model over `argb` entries.
    ///
    /// Without `has_alpha` every entry is made opaque. A `transparent_pixel`
    /// inside the palette is then made fully transparent.
    pub fn new(
        bits: u32,
        argb: &[u32],
        has_alpha: bool,
        transparent_pixel: Option<usize>,
    ) -> Result<Self> {
        if !(1..=16).contains(&bits) {
            return Err(Error::illegal(format!(
                "index pixels hold 1 to 16 bits, got {bits}"
            )));
        }
        if argb.is_empty() || argb.len() > 1 << bits {
            return Err(Error::illegal(format!(
                "palette of {} entries does not fit {bits}-bit indices",
                argb.len()
            )));
        }
        let mut palette: Vec<u32> = argb
            .iter()
            .map(|&c| if has_alpha { c } else { c | 0xff00_0000 })
            .collect();
        let transparent_pixel = transparent_pixel.filter(|&i| i < palette.len());
        if let Some(i) = transparent_pixel {
            palette[i] &= 0x00ff_ffff;
        }

        let transparency = classify(&palette);
        let alpha = transparency != Transparency::Opaque;
        let component_bits = if alpha { vec![8; 4] } else { vec![8; 3] };
        let transfer_type = if bits <= 8 {
            DataType::Byte
        } else {
            DataType::UShort
        };
        let base = ColorModelBase::new(
            bits,
            component_bits,
            ColorSpace::Srgb,
            alpha,
            false,
            transparency,
            transfer_type,
        )?;
        log::debug!(
            "index color model: {} entries, {bits} bits, {transparency:?}",
            palette.len()
        );
        Ok(Self {
            base,
            palette,
            transparent_pixel,
        })
    }

    /// Palette from separate component tables. `alphas`, when given, must
    /// be as long as the color tables.
    pub fn from_components(
        bits: u32,
        reds: &[u8],
        greens: &[u8],
        blues: &[u8],
        alphas: Option<&[u8]>,
    ) -> Result<Self> {
        let n = reds.len();
        if greens.len() != n || blues.len() != n || alphas.is_some_and(|a| a.len() != n) {
            return Err(Error::illegal("component tables differ in length"));
        }
        let argb: Vec<u32> = (0..n)
            .map(|i| {
                let a = alphas.map_or(0xff, |a| a[i]) as u32;
                (a << 24) | ((reds[i] as u32) << 16) | ((greens[i] as u32) << 8) | blues[i] as u32
            })
            .collect();
        Self::new(bits, &argb, alphas.is_some(), None)
    }

    pub fn map_size(&self) -> usize {
        self.palette.len()
    }

    /// Palette as `0xAARRGGBB` entries.
    pub fn palette(&self) -> &[u32] {
        &self.palette
    }

    pub fn transparent_pixel(&self) -> Option<usize> {
        self.transparent_pixel
    }

    pub fn is_valid(&self, pixel: u32) -> bool {
        (pixel as usize) < self.palette.len()
    }

    fn entry(&self, pixel: u32) -> Result<u32> {
        self.palette.get(pixel as usize).copied().ok_or_else(|| {
            Error::out_of_bounds(format!(
                "pixel {pixel} outside palette of {}",
                self.palette.len()
            ))
        })
    }

    /// Index of the palette entry nearest to `argb`.
    ///
    /// Exact matches win. A fully transparent color maps to the transparent
    /// pixel when there is one. Otherwise the squared distance over all four
    /// channels (alpha only when the model has alpha) is minimized.
    pub fn closest_index(&self, argb: u32) -> usize {
        let argb = if self.base.has_alpha {
            argb
        } else {
            argb | 0xff00_0000
        };
        if let Some(i) = self.palette.iter().position(|&c| c == argb) {
            return i;
        }
        if argb >> 24 == 0 {
            if let Some(t) = self.transparent_pixel {
                return t;
            }
        }
        let channel = |c: u32, shift: u32| ((c >> shift) & 0xff) as i32;
        let dist = |c: u32| -> i32 {
            [24, 16, 8, 0]
                .iter()
                .filter(|&&s| s != 24 || self.base.has_alpha)
                .map(|&s| {
                    let d = channel(c, s) - channel(argb, s);
                    d * d
                })
                .sum()
        };
        self.palette
            .iter()
            .enumerate()
            .min_by_key(|&(_, &c)| dist(c))
            .map_or(0, |(i, _)| i)
    }
}

impl ColorModel for IndexColorModel {
    fn base(&self) -> &ColorModelBase {
        &self.base
    }

    fn red(&self, pixel: u32) -> Result<u32> {
        Ok((self.entry(pixel)? >> 16) & 0xff)
    }

    fn green(&self, pixel: u32) -> Result<u32> {
        Ok((self.entry(pixel)? >> 8) & 0xff)
    }

    fn blue(&self, pixel: u32) -> Result<u32> {
        Ok(self.entry(pixel)? & 0xff)
    }

    fn alpha(&self, pixel: u32) -> Result<u32> {
        Ok(self.entry(pixel)? >> 24)
    }

    fn rgb(&self, pixel: u32) -> Result<u32> {
        self.entry(pixel)
    }

    fn data_elements(&self, rgb: u32) -> Result<TransferData> {
        let mut out = TransferData::zeroed(self.base.transfer_type, 1);
        out.set_int(0, self.closest_index(rgb) as i32)?;
        Ok(out)
    }

    /// Components of the palette entry: red, green, blue and, for models
    /// with alpha, alpha.
    fn components(&self, pixel: u32) -> Result<Vec<u32>> {
        let c = self.entry(pixel)?;
        let mut out = vec![(c >> 16) & 0xff, (c >> 8) & 0xff, c & 0xff];
        if self.base.has_alpha {
            out.push(c >> 24);
        }
        Ok(out)
    }

    fn data_element(&self, components: &[u32]) -> Result<u32> {
        let n = self.num_components();
        if components.len() < n {
            return Err(Error::out_of_bounds(format!(
                "{} components given, {n} needed",
                components.len()
            )));
        }
        let a = if self.base.has_alpha {
            components[3] & 0xff
        } else {
            0xff
        };
        let argb = (a << 24)
            | ((components[0] & 0xff) << 16)
            | ((components[1] & 0xff) << 8)
            | (components[2] & 0xff);
        Ok(self.closest_index(argb) as u32)
    }

    /// Sub-byte indices pack into bytes; larger ones get one element each.
    fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        check_raster_dims(width, height)?;
        let bits = self.base.pixel_bits;
        if matches!(bits, 1 | 2 | 4) {
            let sm = MultiPixelPackedSampleModel::new(DataType::Byte, width, height, bits)?;
            return Ok(sm.into());
        }
        let sm = ComponentSampleModel::pixel_interleaved(
            self.base.transfer_type,
            width,
            height,
            1,
            width as usize,
            vec![0],
        )?;
        Ok(sm.into())
    }

    /// Single-band models of the transfer type whose samples can address
    /// the whole palette.
    fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        if sm.num_bands() != 1 || sm.transfer_type() != self.base.transfer_type {
            return false;
        }
        match sm.sample_size(0) {
            Ok(bits) => bits >= 32 || (1usize << bits) >= self.palette.len(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAYS: [u32; 4] = [0xff00_0000, 0xff55_5555, 0xffaa_aaaa, 0xffff_ffff];

    #[test]
    fn test_validation() {
        assert!(IndexColorModel::new(0, &GRAYS, false, None).is_err());
        assert!(IndexColorModel::new(17, &GRAYS, false, None).is_err());
        assert!(IndexColorModel::new(1, &GRAYS, false, None).is_err());
        assert!(IndexColorModel::new(2, &[], false, None).is_err());
        assert!(IndexColorModel::from_components(2, &[0, 1], &[0], &[0, 1], None).is_err());
    }

    #[test]
    fn test_transparency_detection() {
        let opaque = IndexColorModel::new(2, &GRAYS, false, None).unwrap();
        assert_eq!(opaque.transparency(), Transparency::Opaque);
        assert!(!opaque.has_alpha());
        assert_eq!(opaque.num_components(), 3);

        let bitmask = IndexColorModel::new(2, &GRAYS, false, Some(0)).unwrap();
        assert_eq!(bitmask.transparency(), Transparency::Bitmask);
        assert_eq!(bitmask.alpha(0).unwrap(), 0);
        assert_eq!(bitmask.num_components(), 4);

        let translucent = IndexColorModel::new(2, &[0x8000_0000, 0xffff_ffff], true, None).unwrap();
        assert_eq!(translucent.transparency(), Transparency::Translucent);

        // Without alpha, entry alphas are forced opaque.
        let forced = IndexColorModel::new(1, &[0x1234_5678], false, None).unwrap();
        assert_eq!(forced.rgb(0).unwrap(), 0xff34_5678);
    }

    #[test]
    fn test_decode() {
        let cm = IndexColorModel::from_components(
            4,
            &[10, 20, 30],
            &[40, 50, 60],
            &[70, 80, 90],
            Some(&[255, 128, 0]),
        )
        .unwrap();
        assert_eq!(cm.red(1).unwrap(), 20);
        assert_eq!(cm.alpha(1).unwrap(), 128);
        assert_eq!(cm.rgb(2).unwrap(), 0x001e_3c5a);
        assert_eq!(cm.rgb_of(&TransferData::Byte(vec![0])).unwrap(), 0xff0a_2846);
        assert!(matches!(cm.red(3), Err(Error::IndexOutOfBounds(_))));
        assert!(cm.is_valid(2) && !cm.is_valid(3));
    }

    #[test]
    fn test_closest_color() {
        let cm = IndexColorModel::new(2, &GRAYS, false, Some(3)).unwrap();
        assert_eq!(cm.closest_index(0xff55_5555), 1);
        assert_eq!(cm.closest_index(0xff60_5a58), 1);
        assert_eq!(cm.closest_index(0xffa0_b0a8), 2);
        // Transparent colors go to the transparent entry.
        assert_eq!(cm.closest_index(0x0012_3456), 3);
        let data = cm.data_elements(0xff01_0101).unwrap();
        assert_eq!(data, TransferData::Byte(vec![0]));
        assert_eq!(cm.data_element(&[0xaa, 0xaa, 0xaa, 0xff]).unwrap(), 2);
    }

    #[test]
    fn test_compatible_models() {
        let two_bit = IndexColorModel::new(2, &GRAYS, false, None).unwrap();
        let r = two_bit.create_compatible_writable_raster(10, 2).unwrap();
        assert!(matches!(r.sample_model(), SampleModel::MultiPixelPacked(_)));
        assert!(two_bit.is_compatible_raster(&r));
        r.set_data_elements(9, 1, &two_bit.data_elements(0xffff_ffff).unwrap())
            .unwrap();
        assert_eq!(two_bit.rgb_of(&r.data_elements(9, 1).unwrap()).unwrap(), 0xffff_ffff);

        let palette: Vec<u32> = (0..300).map(|i| 0xff00_0000 | i).collect();
        let wide = IndexColorModel::new(9, &palette, false, None).unwrap();
        assert_eq!(wide.transfer_type(), DataType::UShort);
        let sm = wide.create_compatible_sample_model(4, 4).unwrap();
        assert!(matches!(sm, SampleModel::Component(_)));
        assert!(wide.is_compatible_sample_model(&sm));
        assert!(!two_bit.is_compatible_sample_model(&sm));
        assert!(wide.create_compatible_writable_raster(0, 1).is_err());
    }
}
