//! Packed color models: every component is a bit field of one int pixel.
//!
//! [`PackedColorModel`] holds the field layout (masks, offsets, sizes and
//! the factors scaling each field to 8 bits). [`DirectColorModel`] builds
//! on it for RGB color spaces, optionally with premultiplied alpha.

use crate::color_model::{
    check_raster_dims, pack_argb, single_pixel, to_u8, ColorModel, ColorModelBase, Transparency,
};
use crate::color_space::{linear_to_srgb, srgb_to_linear, ColorSpace, ColorSpaceType};
use crate::data_buffer::{DataType, TransferData};
use crate::error::{Error, Result};
use crate::raster::WritableRaster;
use crate::sample_model::{SampleModel, SinglePixelPackedSampleModel};
use crate::sample_model_packed::mask_layout;

// ============================================================================
// PackedColorModel
// ============================================================================

/// Bit field layout shared by packed color models. Component order is the
/// color space's components followed by alpha (when the alpha mask is
/// non-zero).
#[derive(Debug, Clone, PartialEq)]
pub struct PackedColorModel {
    base: ColorModelBase,
    masks: Vec<u32>,
    offsets: Vec<u32>,
    scale_factors: Vec<f32>,
}

impl PackedColorModel {
    pub fn new(
        color_space: ColorSpace,
        pixel_bits: u32,
        color_masks: &[u32],
        alpha_mask: u32,
        is_alpha_premultiplied: bool,
        transfer_type: DataType,
    ) -> Result<Self> {
        if pixel_bits == 0 || pixel_bits > 32 {
            return Err(Error::illegal(format!(
                "packed pixels hold 1 to 32 bits, got {pixel_bits}"
            )));
        }
        if !matches!(transfer_type, DataType::Byte | DataType::UShort | DataType::Int)
            || transfer_type.size_in_bits() < pixel_bits
        {
            return Err(Error::illegal(format!(
                "transfer type {transfer_type:?} cannot hold {pixel_bits}-bit pixels"
            )));
        }
        if color_masks.len() != color_space.num_components() {
            return Err(Error::illegal(format!(
                "{} color masks for a {}-component color space",
                color_masks.len(),
                color_space.num_components()
            )));
        }

        let has_alpha = alpha_mask != 0;
        let mut masks = color_masks.to_vec();
        if has_alpha {
            masks.push(alpha_mask);
        }

        let mut seen = 0u32;
        let mut offsets = Vec::with_capacity(masks.len());
        let mut bits = Vec::with_capacity(masks.len());
        for (c, &m) in masks.iter().enumerate() {
            if m == 0 {
                return Err(Error::illegal(format!("mask of component {c} is empty")));
            }
            if seen & m != 0 {
                return Err(Error::illegal(format!(
                    "mask {m:#x} of component {c} overlaps another mask"
                )));
            }
            seen |= m;
            let (off, size) = mask_layout(m, pixel_bits)?;
            offsets.push(off);
            bits.push(size);
        }
        let scale_factors = bits
            .iter()
            .map(|&n| if n == 8 { 1.0 } else { 255.0 / ((1u64 << n) - 1) as f32 })
            .collect();

        let transparency = if has_alpha {
            Transparency::Translucent
        } else {
            Transparency::Opaque
        };
        let base = ColorModelBase::new(
            pixel_bits,
            bits,
            color_space,
            has_alpha,
            is_alpha_premultiplied,
            transparency,
            transfer_type,
        )?;
        Ok(Self {
            base,
            masks,
            offsets,
            scale_factors,
        })
    }

    pub fn base(&self) -> &ColorModelBase {
        &self.base
    }

    /// Mask of each component, colors first then alpha.
    pub fn masks(&self) -> &[u32] {
        &self.masks
    }

    pub fn mask(&self, component: usize) -> Result<u32> {
        self.masks.get(component).copied().ok_or_else(|| {
            Error::out_of_bounds(format!("component {component} of {}", self.masks.len()))
        })
    }

    pub fn alpha_mask(&self) -> u32 {
        if self.base.has_alpha {
            self.masks[self.masks.len() - 1]
        } else {
            0
        }
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Factors scaling each field to the 8-bit range.
    pub fn scale_factors(&self) -> &[f32] {
        &self.scale_factors
    }

    pub(crate) fn alpha_index(&self) -> Option<usize> {
        self.base.has_alpha.then(|| self.masks.len() - 1)
    }

    /// Raw value of field `c`.
    #[inline]
    pub(crate) fn field(&self, pixel: u32, c: usize) -> u32 {
        (pixel & self.masks[c]) >> self.offsets[c]
    }

    pub(crate) fn max_field(&self, c: usize) -> u32 {
        self.masks[c] >> self.offsets[c]
    }

    /// Field `c` scaled to 8 bits.
    pub(crate) fn field_8bit(&self, pixel: u32, c: usize) -> u32 {
        let raw = self.field(pixel, c);
        if self.base.bits[c] == 8 {
            raw
        } else {
            ((raw as f32 * self.scale_factors[c] + 0.5) as u32).min(255)
        }
    }

    /// Store normalized `v` in field `c` of `pixel`.
    pub(crate) fn put_normalized(&self, pixel: u32, c: usize, v: f32) -> u32 {
        let raw = (v.clamp(0.0, 1.0) * self.max_field(c) as f32 + 0.5) as u32;
        self.put_field(pixel, c, raw)
    }

    pub(crate) fn put_field(&self, pixel: u32, c: usize, raw: u32) -> u32 {
        (pixel & !self.masks[c]) | ((raw << self.offsets[c]) & self.masks[c])
    }

    pub(crate) fn components(&self, pixel: u32) -> Vec<u32> {
        (0..self.masks.len()).map(|c| self.field(pixel, c)).collect()
    }

    pub(crate) fn compose(&self, components: &[u32]) -> Result<u32> {
        if components.len() < self.masks.len() {
            return Err(Error::out_of_bounds(format!(
                "{} components given, {} needed",
                components.len(),
                self.masks.len()
            )));
        }
        Ok((0..self.masks.len()).fold(0, |p, c| self.put_field(p, c, components[c])))
    }

    pub(crate) fn transfer(&self, pixel: u32) -> Result<TransferData> {
        let mut out = TransferData::zeroed(self.base.transfer_type, 1);
        out.set_int(0, pixel as i32)?;
        Ok(out)
    }

    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        check_raster_dims(width, height)?;
        let sm = SinglePixelPackedSampleModel::new(
            self.base.transfer_type,
            width,
            height,
            &self.masks,
        )?;
        Ok(sm.into())
    }

    /// `true` for single-pixel packed models with the same masks and type.
    pub fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        match sm {
            SampleModel::SinglePixelPacked(m) => {
                m.data_type() == self.base.transfer_type && m.bit_masks() == self.masks.as_slice()
            }
            _ => false,
        }
    }
}

// ============================================================================
// DirectColorModel
// ============================================================================

/// Packed RGB color model, as used for `0xAARRGGBB` ints or 5-6-5 shorts.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectColorModel {
    packed: PackedColorModel,
}

impl DirectColorModel {
    /// Non-premultiplied sRGB model. The transfer type is the smallest one
    /// holding `pixel_bits`; an `alpha_mask` of 0 means no alpha.
    pub fn new(
        pixel_bits: u32,
        red_mask: u32,
        green_mask: u32,
        blue_mask: u32,
        alpha_mask: u32,
    ) -> Result<Self> {
        let transfer_type = DataType::unsigned_for_bits(pixel_bits)?;
        Self::with_color_space(
            ColorSpace::Srgb,
            pixel_bits,
            [red_mask, green_mask, blue_mask],
            alpha_mask,
            false,
            transfer_type,
        )
    }

    /// Model over an RGB color space (sRGB or linear RGB).
    pub fn with_color_space(
        color_space: ColorSpace,
        pixel_bits: u32,
        rgb_masks: [u32; 3],
        alpha_mask: u32,
        is_alpha_premultiplied: bool,
        transfer_type: DataType,
    ) -> Result<Self> {
        if color_space.space_type() != ColorSpaceType::Rgb {
            return Err(Error::illegal(format!(
                "direct color models need an RGB color space, got {color_space:?}"
            )));
        }
        let packed = PackedColorModel::new(
            color_space,
            pixel_bits,
            &rgb_masks,
            alpha_mask,
            is_alpha_premultiplied,
            transfer_type,
        )?;
        log::debug!(
            "direct color model {pixel_bits} bits, masks {:x?}, {color_space:?}",
            packed.masks()
        );
        Ok(Self { packed })
    }

    pub fn packed(&self) -> &PackedColorModel {
        &self.packed
    }

    pub fn red_mask(&self) -> u32 {
        self.packed.masks[0]
    }

    pub fn green_mask(&self) -> u32 {
        self.packed.masks[1]
    }

    pub fn blue_mask(&self) -> u32 {
        self.packed.masks[2]
    }

    pub fn alpha_mask(&self) -> u32 {
        self.packed.alpha_mask()
    }

    fn is_linear(&self) -> bool {
        self.packed.base.color_space == ColorSpace::LinearRgb
    }

    /// Normalized alpha of `pixel`, 1 when there is no alpha.
    fn alpha_norm(&self, pixel: u32) -> f32 {
        match self.packed.alpha_index() {
            Some(a) => self.packed.field(pixel, a) as f32 / self.packed.max_field(a) as f32,
            None => 1.0,
        }
    }

    fn color(&self, pixel: u32, c: usize) -> u32 {
        let p = &self.packed;
        let premultiplied = p.base.is_alpha_premultiplied;
        if self.is_linear() {
            let mut v = p.field(pixel, c) as f32 / p.max_field(c) as f32;
            if premultiplied {
                let a = self.alpha_norm(pixel);
                v = if a == 0.0 { 0.0 } else { (v / a).min(1.0) };
            }
            return to_u8(linear_to_srgb(v));
        }
        let v = p.field_8bit(pixel, c);
        if !premultiplied {
            return v;
        }
        let a = self.alpha_8bit(pixel);
        match a {
            0 => 0,
            255 => v,
            _ => ((v * 255 + a / 2) / a).min(255),
        }
    }

    fn alpha_8bit(&self, pixel: u32) -> u32 {
        match self.packed.alpha_index() {
            Some(a) => self.packed.field_8bit(pixel, a),
            None => 255,
        }
    }

    /// Packed pixel for the ARGB color `argb`.
    pub fn pixel_for(&self, argb: u32) -> u32 {
        let p = &self.packed;
        let a8 = argb >> 24;
        let a = a8 as f32 / 255.0;
        let mut pixel = 0;
        for (c, shift) in [16u32, 8, 0].into_iter().enumerate() {
            let c8 = (argb >> shift) & 0xff;
            if !self.is_linear() && !p.base.is_alpha_premultiplied && p.base.bits[c] == 8 {
                pixel = p.put_field(pixel, c, c8);
                continue;
            }
            let mut v = c8 as f32 / 255.0;
            if self.is_linear() {
                v = srgb_to_linear(v);
            }
            if p.base.is_alpha_premultiplied {
                v *= a;
            }
            pixel = p.put_normalized(pixel, c, v);
        }
        if let Some(ai) = p.alpha_index() {
            pixel = if p.base.bits[ai] == 8 {
                p.put_field(pixel, ai, a8)
            } else {
                p.put_normalized(pixel, ai, a)
            };
        }
        pixel
    }

    /// Convert the pixels of `raster` to the given premultiplication state
    /// and return the model describing the result. Models without alpha,
    /// or already in that state, leave the raster untouched.
    pub fn coerce_data(
        &self,
        raster: &WritableRaster,
        premultiplied: bool,
    ) -> Result<DirectColorModel> {
        let Some(ai) = self.packed.alpha_index() else {
            return Ok(self.clone());
        };
        if premultiplied == self.packed.base.is_alpha_premultiplied {
            return Ok(self.clone());
        }
        if !self.is_compatible_raster(raster) {
            return Err(Error::illegal("raster is not compatible with this color model"));
        }
        log::debug!(
            "coercing {}x{} raster to premultiplied = {premultiplied}",
            raster.width(),
            raster.height()
        );
        let p = &self.packed;
        for y in raster.min_y()..raster.min_y() + raster.height() {
            for x in raster.min_x()..raster.min_x() + raster.width() {
                let pixel = single_pixel(&raster.data_elements(x, y)?)?;
                let a = self.alpha_norm(pixel);
                let mut out = pixel;
                for c in 0..ai {
                    let v = p.field(pixel, c) as f32 / p.max_field(c) as f32;
                    let v = if premultiplied {
                        v * a
                    } else if a == 0.0 {
                        v
                    } else {
                        (v / a).min(1.0)
                    };
                    out = p.put_normalized(out, c, v);
                }
                raster.set_data_elements(x, y, &p.transfer(out)?)?;
            }
        }
        let mut packed = self.packed.clone();
        packed.base.is_alpha_premultiplied = premultiplied;
        Ok(Self { packed })
    }
}

impl ColorModel for DirectColorModel {
    fn base(&self) -> &ColorModelBase {
        &self.packed.base
    }

    fn red(&self, pixel: u32) -> Result<u32> {
        Ok(self.color(pixel, 0))
    }

    fn green(&self, pixel: u32) -> Result<u32> {
        Ok(self.color(pixel, 1))
    }

    fn blue(&self, pixel: u32) -> Result<u32> {
        Ok(self.color(pixel, 2))
    }

    fn alpha(&self, pixel: u32) -> Result<u32> {
        Ok(self.alpha_8bit(pixel))
    }

    fn rgb(&self, pixel: u32) -> Result<u32> {
        Ok(pack_argb(
            self.alpha_8bit(pixel),
            self.color(pixel, 0),
            self.color(pixel, 1),
            self.color(pixel, 2),
        ))
    }

    fn data_elements(&self, rgb: u32) -> Result<TransferData> {
        self.packed.transfer(self.pixel_for(rgb))
    }

    fn components(&self, pixel: u32) -> Result<Vec<u32>> {
        self.check_unnormalized()?;
        Ok(self.packed.components(pixel))
    }

    fn data_element(&self, components: &[u32]) -> Result<u32> {
        self.check_unnormalized()?;
        self.packed.compose(components)
    }

    fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        self.packed.create_compatible_sample_model(width, height)
    }

    fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        self.packed.is_compatible_sample_model(sm)
    }
}
