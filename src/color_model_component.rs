//! Component color model: one sample per color component (plus alpha).
//!
//! Pairs with [`ComponentSampleModel`] rasters. Integral samples are
//! normalized by their bit depth and scaled onto the color space's range;
//! floating point samples hold color space values directly.

use crate::color_model::{
    check_raster_dims, pack_argb, to_u8, ColorModel, ColorModelBase, Transparency,
};
use crate::color_space::ColorSpace;
use crate::data_buffer::{DataType, TransferData};
use crate::error::{Error, Result};
use crate::sample_model::{ComponentSampleModel, SampleModel};

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentColorModel {
    base: ColorModelBase,
}

impl ComponentColorModel {
    /// Model whose components use the full width of `transfer_type`.
    pub fn new(
        color_space: ColorSpace,
        has_alpha: bool,
        is_alpha_premultiplied: bool,
        transfer_type: DataType,
    ) -> Result<Self> {
        let n = color_space.num_components() + usize::from(has_alpha);
        let bits = vec![transfer_type.size_in_bits(); n];
        Self::with_bits(
            color_space,
            bits,
            has_alpha,
            is_alpha_premultiplied,
            transfer_type,
        )
    }

    /// Model with explicit significant bits per component. Floating point
    /// transfer types always use their full width.
    pub fn with_bits(
        color_space: ColorSpace,
        bits: Vec<u32>,
        has_alpha: bool,
        is_alpha_premultiplied: bool,
        transfer_type: DataType,
    ) -> Result<Self> {
        let width = transfer_type.size_in_bits();
        for (c, &b) in bits.iter().enumerate() {
            let ok = if transfer_type.is_floating() {
                b == width
            } else {
                (1..=width).contains(&b)
            };
            if !ok {
                return Err(Error::illegal(format!(
                    "component {c} has {b} bits, which {transfer_type:?} samples cannot hold"
                )));
            }
        }
        let transparency = if has_alpha {
            Transparency::Translucent
        } else {
            Transparency::Opaque
        };
        let pixel_bits = bits.iter().sum();
        let base = ColorModelBase::new(
            pixel_bits,
            bits,
            color_space,
            has_alpha,
            is_alpha_premultiplied,
            transparency,
            transfer_type,
        )?;
        log::debug!(
            "component color model {color_space:?}, {transfer_type:?}, alpha = {has_alpha}"
        );
        Ok(Self { base })
    }

    fn is_floating(&self) -> bool {
        self.base.transfer_type.is_floating()
    }

    fn max_raw(&self, c: usize) -> f64 {
        ((1u64 << self.base.bits[c]) - 1) as f64
    }

    /// Sample `c` as an unsigned value of its bit width. Full-width `Short`
    /// and `Int` samples come back from the array sign-extended.
    fn raw_sample(&self, data: &TransferData, c: usize) -> Result<u32> {
        let mask = ((1u64 << self.base.bits[c]) - 1) as u32;
        Ok(data.get_int(c)? as u32 & mask)
    }

    fn check_len(&self, data: &TransferData) -> Result<()> {
        if data.data_type() != self.base.transfer_type {
            return Err(Error::illegal(format!(
                "transfer array of {:?} where {:?} is expected",
                data.data_type(),
                self.base.transfer_type
            )));
        }
        if data.len() < self.num_components() {
            return Err(Error::out_of_bounds(format!(
                "{} elements given, {} needed",
                data.len(),
                self.num_components()
            )));
        }
        Ok(())
    }

    /// Color space values and alpha (in `[0, 1]`) of one pixel, with
    /// premultiplication undone.
    fn decode(&self, data: &TransferData) -> Result<(Vec<f32>, f32)> {
        self.check_len(data)?;
        let cs = self.base.color_space;
        let n = self.num_components();
        let mut values = Vec::with_capacity(n);
        for c in 0..n {
            let v = if self.is_floating() {
                data.get_double(c)? as f32
            } else {
                let unit = (self.raw_sample(data, c)? as f64 / self.max_raw(c)) as f32;
                if c < cs.num_components() {
                    cs.min_value(c) + unit * (cs.max_value(c) - cs.min_value(c))
                } else {
                    unit
                }
            };
            values.push(v);
        }
        let alpha = if self.base.has_alpha {
            values.pop().map_or(1.0, |a| a.clamp(0.0, 1.0))
        } else {
            1.0
        };
        if self.base.is_alpha_premultiplied {
            for v in &mut values {
                *v = if alpha == 0.0 { 0.0 } else { *v / alpha };
            }
        }
        Ok((values, alpha))
    }

    fn decode_rgb(&self, data: &TransferData) -> Result<[u32; 4]> {
        let (values, alpha) = self.decode(data)?;
        let rgb = self.base.color_space.to_rgb(&values);
        Ok([to_u8(alpha), to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2])])
    }

    /// A packed `u32` pixel only exists for single-component models.
    fn single_sample(&self, pixel: u32) -> Result<TransferData> {
        if self.num_components() != 1 || self.is_floating() {
            return Err(Error::unsupported(
                "pixel values of this component model do not fit a single int",
            ));
        }
        let mut data = TransferData::zeroed(self.base.transfer_type, 1);
        data.set_int(0, pixel as i32)?;
        Ok(data)
    }
}

impl ColorModel for ComponentColorModel {
    fn base(&self) -> &ColorModelBase {
        &self.base
    }

    fn check_unnormalized(&self) -> Result<()> {
        if self.is_floating() {
            return Err(Error::unsupported(
                "floating point samples have no unnormalized form",
            ));
        }
        self.base.check_unit_range()
    }

    fn red(&self, pixel: u32) -> Result<u32> {
        self.red_of(&self.single_sample(pixel)?)
    }

    fn green(&self, pixel: u32) -> Result<u32> {
        self.green_of(&self.single_sample(pixel)?)
    }

    fn blue(&self, pixel: u32) -> Result<u32> {
        self.blue_of(&self.single_sample(pixel)?)
    }

    fn alpha(&self, pixel: u32) -> Result<u32> {
        self.alpha_of(&self.single_sample(pixel)?)
    }

    fn red_of(&self, data: &TransferData) -> Result<u32> {
        Ok(self.decode_rgb(data)?[1])
    }

    fn green_of(&self, data: &TransferData) -> Result<u32> {
        Ok(self.decode_rgb(data)?[2])
    }

    fn blue_of(&self, data: &TransferData) -> Result<u32> {
        Ok(self.decode_rgb(data)?[3])
    }

    fn alpha_of(&self, data: &TransferData) -> Result<u32> {
        Ok(self.decode_rgb(data)?[0])
    }

    fn rgb_of(&self, data: &TransferData) -> Result<u32> {
        let [a, r, g, b] = self.decode_rgb(data)?;
        Ok(pack_argb(a, r, g, b))
    }

    fn rgb(&self, pixel: u32) -> Result<u32> {
        self.rgb_of(&self.single_sample(pixel)?)
    }

    fn data_elements(&self, rgb: u32) -> Result<TransferData> {
        let cs = self.base.color_space;
        let srgb = [16, 8, 0].map(|s| ((rgb >> s) & 0xff) as f32 / 255.0);
        let alpha = (rgb >> 24) as f32 / 255.0;
        let mut values = cs.from_rgb(srgb);
        if self.base.is_alpha_premultiplied {
            for v in &mut values {
                *v *= alpha;
            }
        }
        if self.base.has_alpha {
            values.push(alpha);
        }
        let mut out = TransferData::zeroed(self.base.transfer_type, values.len());
        for (c, &v) in values.iter().enumerate() {
            if self.is_floating() {
                out.set_double(c, v as f64)?;
                continue;
            }
            let unit = if c < cs.num_components() {
                (v - cs.min_value(c)) / (cs.max_value(c) - cs.min_value(c))
            } else {
                v
            };
            let raw = unit.clamp(0.0, 1.0) as f64 * self.max_raw(c) + 0.5;
            out.set_int(c, raw as u32 as i32)?;
        }
        Ok(out)
    }

    fn components(&self, pixel: u32) -> Result<Vec<u32>> {
        self.check_unnormalized()?;
        self.components_of(&self.single_sample(pixel)?)
    }

    fn components_of(&self, data: &TransferData) -> Result<Vec<u32>> {
        self.check_unnormalized()?;
        self.check_len(data)?;
        (0..self.num_components())
            .map(|c| self.raw_sample(data, c))
            .collect()
    }

    fn data_element(&self, components: &[u32]) -> Result<u32> {
        self.check_unnormalized()?;
        if self.num_components() != 1 {
            return Err(Error::unsupported(
                "pixel values of this component model do not fit a single int",
            ));
        }
        components
            .first()
            .copied()
            .ok_or_else(|| Error::out_of_bounds("no components given"))
    }

    fn data_elements_from_components(&self, components: &[u32]) -> Result<TransferData> {
        self.check_unnormalized()?;
        let n = self.num_components();
        if components.len() < n {
            return Err(Error::out_of_bounds(format!(
                "{} components given, {n} needed",
                components.len()
            )));
        }
        let mut out = TransferData::zeroed(self.base.transfer_type, n);
        for (c, &v) in components.iter().take(n).enumerate() {
            out.set_int(c, v as i32)?;
        }
        Ok(out)
    }

    /// Pixel-interleaved samples, one band per component.
    fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        check_raster_dims(width, height)?;
        let n = self.num_components();
        let sm = ComponentSampleModel::pixel_interleaved(
            self.base.transfer_type,
            width,
            height,
            n,
            width as usize * n,
            (0..n).collect(),
        )?;
        Ok(sm.into())
    }

    fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool {
        matches!(sm, SampleModel::Component(_))
            && sm.num_bands() == self.num_components()
            && sm.transfer_type() == self.base.transfer_type
    }
}
