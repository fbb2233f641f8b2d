//! Color models: decoding stored pixels into ARGB colors and back.
//!
//! A color model interprets the pixel values of a raster. Pixels arrive
//! either as a packed `u32` (for models whose pixel fits one int) or as a
//! transfer array read with [`Raster::data_elements`]. Decoded colors are
//! non-premultiplied sRGB with 8 bits per component; [`ColorModel::rgb`]
//! packs them as `(A << 24) | (R << 16) | (G << 8) | B`.
//!
//! Unnormalized components are the raw integer samples. Converting them to
//! normalized floats assumes every color space component ranges over
//! `[0, 1]`, so models over other spaces reject those operations with
//! [`Error::UnsupportedOperation`].

use crate::color_space::ColorSpace;
use crate::data_buffer::{DataType, TransferData};
use crate::error::{Error, Result};
use crate::raster::{Raster, WritableRaster};
use crate::sample_model::SampleModel;

/// How a model's colors use alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transparency {
    /// Every pixel is fully opaque.
    Opaque,
    /// Pixels are either fully opaque or fully transparent.
    Bitmask,
    /// Alpha takes arbitrary values.
    Translucent,
}

/// State shared by every color model.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorModelBase {
    pub(crate) pixel_bits: u32,
    pub(crate) bits: Vec<u32>,
    pub(crate) color_space: ColorSpace,
    pub(crate) has_alpha: bool,
    pub(crate) is_alpha_premultiplied: bool,
    pub(crate) transparency: Transparency,
    pub(crate) transfer_type: DataType,
}

impl ColorModelBase {
    pub(crate) fn new(
        pixel_bits: u32,
        bits: Vec<u32>,
        color_space: ColorSpace,
        has_alpha: bool,
        is_alpha_premultiplied: bool,
        transparency: Transparency,
        transfer_type: DataType,
    ) -> Result<Self> {
        if pixel_bits == 0 {
            return Err(Error::illegal("pixel size must be > 0"));
        }
        let expected = color_space.num_components() + usize::from(has_alpha);
        if bits.len() != expected {
            return Err(Error::illegal(format!(
                "{} component sizes for {expected} components",
                bits.len()
            )));
        }
        Ok(Self {
            pixel_bits,
            bits,
            color_space,
            has_alpha,
            is_alpha_premultiplied: has_alpha && is_alpha_premultiplied,
            transparency,
            transfer_type,
        })
    }

    pub(crate) fn num_components(&self) -> usize {
        self.bits.len()
    }

    /// Fails unless unnormalized components can map onto `[0, 1]`.
    pub(crate) fn check_unit_range(&self) -> Result<()> {
        if !self.color_space.is_unit_range() {
            return Err(Error::unsupported(format!(
                "unnormalized components need a [0, 1] color space, not {:?}",
                self.color_space
            )));
        }
        Ok(())
    }

    fn max_raw(&self, c: usize) -> f32 {
        ((1u128 << self.bits[c]) - 1) as f32
    }
}

/// The single pixel held by a transfer array of a one-int-per-pixel model.
pub(crate) fn single_pixel(data: &TransferData) -> Result<u32> {
    if data.len() != 1 {
        return Err(Error::unsupported(format!(
            "this color model takes one element per pixel, got {}",
            data.len()
        )));
    }
    Ok(data.get_int(0)? as u32)
}

/// Round a `[0, 1]` value to 8 bits.
pub(crate) fn to_u8(v: f32) -> u32 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32
}

pub(crate) fn pack_argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
    (a << 24) | (r << 16) | (g << 8) | b
}

pub(crate) fn check_raster_dims(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(Error::illegal(format!(
            "width ({width}) and height ({height}) must be > 0"
        )));
    }
    Ok(())
}

pub trait ColorModel: std::fmt::Debug {
    fn base(&self) -> &ColorModelBase;

    // ========================================================================
    // Description
    // ========================================================================

    /// Bits per pixel.
    fn pixel_size(&self) -> u32 {
        self.base().pixel_bits
    }

    /// Bits of each component, colors first then alpha.
    fn component_sizes(&self) -> &[u32] {
        &self.base().bits
    }

    fn component_size(&self, component: usize) -> Result<u32> {
        self.base().bits.get(component).copied().ok_or_else(|| {
            Error::out_of_bounds(format!(
                "component {component} of {}",
                self.num_components()
            ))
        })
    }

    /// Color components plus alpha.
    fn num_components(&self) -> usize {
        self.base().num_components()
    }

    fn num_color_components(&self) -> usize {
        self.base().color_space.num_components()
    }

    fn color_space(&self) -> ColorSpace {
        self.base().color_space
    }

    fn has_alpha(&self) -> bool {
        self.base().has_alpha
    }

    fn is_alpha_premultiplied(&self) -> bool {
        self.base().is_alpha_premultiplied
    }

    fn transparency(&self) -> Transparency {
        self.base().transparency
    }

    /// Element type of the transfer arrays this model reads and writes.
    fn transfer_type(&self) -> DataType {
        self.base().transfer_type
    }

    // ========================================================================
    // Packed pixel decoding
    // ========================================================================

    fn red(&self, pixel: u32) -> Result<u32>;
    fn green(&self, pixel: u32) -> Result<u32>;
    fn blue(&self, pixel: u32) -> Result<u32>;
    fn alpha(&self, pixel: u32) -> Result<u32>;

    /// Non-premultiplied sRGB as `0xAARRGGBB`.
    fn rgb(&self, pixel: u32) -> Result<u32> {
        Ok(pack_argb(
            self.alpha(pixel)?,
            self.red(pixel)?,
            self.green(pixel)?,
            self.blue(pixel)?,
        ))
    }

    // ========================================================================
    // Transfer array decoding
    // ========================================================================

    fn red_of(&self, data: &TransferData) -> Result<u32> {
        self.red(single_pixel(data)?)
    }

    fn green_of(&self, data: &TransferData) -> Result<u32> {
        self.green(single_pixel(data)?)
    }

    fn blue_of(&self, data: &TransferData) -> Result<u32> {
        self.blue(single_pixel(data)?)
    }

    fn alpha_of(&self, data: &TransferData) -> Result<u32> {
        self.alpha(single_pixel(data)?)
    }

    fn rgb_of(&self, data: &TransferData) -> Result<u32> {
        Ok(pack_argb(
            self.alpha_of(data)?,
            self.red_of(data)?,
            self.green_of(data)?,
            self.blue_of(data)?,
        ))
    }

    // ========================================================================
    // Encoding and components
    // ========================================================================

    /// Fails with [`Error::UnsupportedOperation`] when raw integer samples
    /// cannot stand for this model's components.
    fn check_unnormalized(&self) -> Result<()> {
        self.base().check_unit_range()
    }

    /// Pixel for the ARGB color `rgb`, as a transfer array.
    fn data_elements(&self, rgb: u32) -> Result<TransferData>;

    /// Unnormalized components of a packed pixel.
    fn components(&self, pixel: u32) -> Result<Vec<u32>>;

    fn components_of(&self, data: &TransferData) -> Result<Vec<u32>> {
        self.components(single_pixel(data)?)
    }

    /// Packed pixel from unnormalized components.
    fn data_element(&self, components: &[u32]) -> Result<u32>;

    /// Transfer array from unnormalized components.
    fn data_elements_from_components(&self, components: &[u32]) -> Result<TransferData> {
        let mut out = TransferData::zeroed(self.transfer_type(), 1);
        out.set_int(0, self.data_element(components)? as i32)?;
        Ok(out)
    }

    /// Unnormalized to normalized components. Premultiplied color
    /// components are divided by alpha.
    fn normalized_components(&self, components: &[u32]) -> Result<Vec<f32>> {
        self.check_unnormalized()?;
        let base = self.base();
        let n = self.num_components();
        if components.len() < n {
            return Err(Error::out_of_bounds(format!(
                "{} components given, {n} needed",
                components.len()
            )));
        }
        let mut out: Vec<f32> = (0..n)
            .map(|c| components[c] as f32 / base.max_raw(c))
            .collect();
        if base.is_alpha_premultiplied {
            let a = out[n - 1];
            for v in out.iter_mut().take(n - 1) {
                *v = if a != 0.0 { (*v / a).min(1.0) } else { 0.0 };
            }
        }
        Ok(out)
    }

    /// Normalized to unnormalized components, multiplying color by alpha
    /// for premultiplied models.
    fn unnormalized_components(&self, normalized: &[f32]) -> Result<Vec<u32>> {
        self.check_unnormalized()?;
        let base = self.base();
        let n = self.num_components();
        if normalized.len() < n {
            return Err(Error::out_of_bounds(format!(
                "{} components given, {n} needed",
                normalized.len()
            )));
        }
        let a = if base.is_alpha_premultiplied {
            normalized[n - 1]
        } else {
            1.0
        };
        Ok((0..n)
            .map(|c| {
                let v = if base.has_alpha && c == n - 1 {
                    normalized[c]
                } else {
                    normalized[c] * a
                };
                (v.clamp(0.0, 1.0) * base.max_raw(c) + 0.5) as u32
            })
            .collect())
    }

    // ========================================================================
    // Compatible storage
    // ========================================================================

    /// Sample model laid out the way this model expects pixels.
    fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel>;

    fn create_compatible_writable_raster(&self, width: i32, height: i32) -> Result<WritableRaster> {
        check_raster_dims(width, height)?;
        let sm = self.create_compatible_sample_model(width, height)?;
        let db = sm.create_data_buffer()?;
        log::debug!("compatible {width}x{height} raster for {:?}", self.color_space());
        WritableRaster::new(sm, db, (0, 0))
    }

    fn is_compatible_sample_model(&self, sm: &SampleModel) -> bool;

    fn is_compatible_raster(&self, raster: &Raster) -> bool {
        self.is_compatible_sample_model(raster.sample_model())
    }
}
