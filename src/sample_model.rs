//! Sample models: the mapping from `(x, y, band)` to data buffer storage.
//!
//! A [`SampleModel`] knows nothing about the buffer it is used with beyond
//! its layout. Every accessor takes the buffer explicitly, so one model can
//! describe many buffers (and a child raster can reuse its parent's model
//! under a translation).
//!
//! The set of layouts is fixed, so the family is a closed enum:
//!
//! - [`ComponentSampleModel`]: one element per sample, interleaved or banded.
//! - [`SinglePixelPackedSampleModel`]: one element per pixel, masked fields.
//! - [`MultiPixelPackedSampleModel`]: several single-band pixels per element.

use crate::data_buffer::{DataBuffer, DataType, TransferData};
use crate::error::{Error, Result};

pub use crate::sample_model_component::ComponentSampleModel;
pub use crate::sample_model_multi_packed::MultiPixelPackedSampleModel;
pub use crate::sample_model_packed::SinglePixelPackedSampleModel;

#[derive(Debug, Clone, PartialEq)]
pub enum SampleModel {
    Component(ComponentSampleModel),
    SinglePixelPacked(SinglePixelPackedSampleModel),
    MultiPixelPacked(MultiPixelPackedSampleModel),
}

/// Run `$body` with `$m` bound to the concrete model.
macro_rules! each_model {
    ($value:expr, $m:ident => $body:expr) => {
        match $value {
            SampleModel::Component($m) => $body,
            SampleModel::SinglePixelPacked($m) => $body,
            SampleModel::MultiPixelPacked($m) => $body,
        }
    };
}

impl From<ComponentSampleModel> for SampleModel {
    fn from(m: ComponentSampleModel) -> Self {
        SampleModel::Component(m)
    }
}

impl From<SinglePixelPackedSampleModel> for SampleModel {
    fn from(m: SinglePixelPackedSampleModel) -> Self {
        SampleModel::SinglePixelPacked(m)
    }
}

impl From<MultiPixelPackedSampleModel> for SampleModel {
    fn from(m: MultiPixelPackedSampleModel) -> Self {
        SampleModel::MultiPixelPacked(m)
    }
}

impl SampleModel {
    // ========================================================================
    // Layout queries
    // ========================================================================

    pub fn width(&self) -> i32 {
        each_model!(self, m => m.width())
    }

    pub fn height(&self) -> i32 {
        each_model!(self, m => m.height())
    }

    pub fn num_bands(&self) -> usize {
        match self {
            SampleModel::Component(m) => m.num_bands(),
            SampleModel::SinglePixelPacked(m) => m.num_bands(),
            SampleModel::MultiPixelPacked(_) => 1,
        }
    }

    /// Storage type of the data buffer this model addresses.
    pub fn data_type(&self) -> DataType {
        each_model!(self, m => m.data_type())
    }

    /// Element type of the arrays exchanged by
    /// [`data_elements`](Self::data_elements).
    pub fn transfer_type(&self) -> DataType {
        match self {
            SampleModel::MultiPixelPacked(m) => m.transfer_type(),
            other => other.data_type(),
        }
    }

    /// Length of the transfer array for one pixel.
    pub fn num_data_elements(&self) -> usize {
        match self {
            SampleModel::Component(m) => m.num_bands(),
            _ => 1,
        }
    }

    /// Significant bits of samples in `band`.
    pub fn sample_size(&self, band: usize) -> Result<u32> {
        self.check_band(band)?;
        Ok(match self {
            SampleModel::Component(m) => m.data_type().size_in_bits(),
            SampleModel::SinglePixelPacked(m) => m.sample_size(band),
            SampleModel::MultiPixelPacked(m) => m.pixel_bit_stride(),
        })
    }

    pub fn sample_sizes(&self) -> Vec<u32> {
        (0..self.num_bands())
            .filter_map(|b| self.sample_size(b).ok())
            .collect()
    }

    /// `true` if `db` has the storage type, bank count and size this model
    /// addresses.
    pub fn is_compatible_buffer(&self, db: &DataBuffer) -> bool {
        let (size, banks) = each_model!(self, m => m.buffer_layout());
        db.data_type() == self.data_type() && db.num_banks() >= banks && db.size() >= size
    }

    // ========================================================================
    // Bounds checks
    // ========================================================================

    fn check_band(&self, band: usize) -> Result<()> {
        if band >= self.num_bands() {
            return Err(Error::out_of_bounds(format!(
                "band {band} of {}",
                self.num_bands()
            )));
        }
        Ok(())
    }

    fn check_xy(&self, x: i32, y: i32) -> Result<(usize, usize)> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return Err(Error::out_of_bounds(format!(
                "({x}, {y}) outside {}x{} sample model",
                self.width(),
                self.height()
            )));
        }
        Ok((x as usize, y as usize))
    }

    fn check_region(&self, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
        let x1 = x as i64 + w as i64;
        let y1 = y as i64 + h as i64;
        if x < 0
            || y < 0
            || w < 0
            || h < 0
            || x1 > self.width() as i64
            || y1 > self.height() as i64
        {
            return Err(Error::out_of_bounds(format!(
                "region ({x}, {y}, {w}, {h}) outside {}x{} sample model",
                self.width(),
                self.height()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Samples
    // ========================================================================

    pub fn sample(&self, x: i32, y: i32, band: usize, db: &DataBuffer) -> Result<i32> {
        let (x, y) = self.check_xy(x, y)?;
        self.check_band(band)?;
        match self {
            SampleModel::Component(m) => m.sample(x, y, band, db),
            SampleModel::SinglePixelPacked(m) => m.sample(x, y, band, db),
            SampleModel::MultiPixelPacked(m) => m.sample(x, y, db),
        }
    }

    pub fn set_sample(
        &self,
        x: i32,
        y: i32,
        band: usize,
        value: i32,
        db: &mut DataBuffer,
    ) -> Result<()> {
        let (x, y) = self.check_xy(x, y)?;
        self.check_band(band)?;
        match self {
            SampleModel::Component(m) => m.set_sample(x, y, band, value, db),
            SampleModel::SinglePixelPacked(m) => m.set_sample(x, y, band, value, db),
            SampleModel::MultiPixelPacked(m) => m.set_sample(x, y, value, db),
        }
    }

    /// Sample as `f64`. Packed models hold integral samples only.
    pub fn sample_double(&self, x: i32, y: i32, band: usize, db: &DataBuffer) -> Result<f64> {
        match self {
            SampleModel::Component(m) => {
                let (x, y) = self.check_xy(x, y)?;
                self.check_band(band)?;
                m.sample_double(x, y, band, db)
            }
            _ => Ok(self.sample(x, y, band, db)? as f64),
        }
    }

    pub fn set_sample_double(
        &self,
        x: i32,
        y: i32,
        band: usize,
        value: f64,
        db: &mut DataBuffer,
    ) -> Result<()> {
        match self {
            SampleModel::Component(m) => {
                let (x, y) = self.check_xy(x, y)?;
                self.check_band(band)?;
                m.set_sample_double(x, y, band, value, db)
            }
            _ => self.set_sample(x, y, band, value as i32, db),
        }
    }

    pub fn sample_float(&self, x: i32, y: i32, band: usize, db: &DataBuffer) -> Result<f32> {
        Ok(self.sample_double(x, y, band, db)? as f32)
    }

    pub fn set_sample_float(
        &self,
        x: i32,
        y: i32,
        band: usize,
        value: f32,
        db: &mut DataBuffer,
    ) -> Result<()> {
        self.set_sample_double(x, y, band, value as f64, db)
    }

    /// Samples of one band over a `w` x `h` region, row-major.
    pub fn samples(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        db: &DataBuffer,
    ) -> Result<Vec<i32>> {
        self.check_region(x, y, w, h)?;
        let mut out = Vec::with_capacity((w as usize) * (h as usize));
        for j in y..y + h {
            for i in x..x + w {
                out.push(self.sample(i, j, band, db)?);
            }
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_samples(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        values: &[i32],
        db: &mut DataBuffer,
    ) -> Result<()> {
        self.check_region(x, y, w, h)?;
        let need = (w as usize) * (h as usize);
        if values.len() < need {
            return Err(Error::out_of_bounds(format!(
                "{} samples given for a region of {need}",
                values.len()
            )));
        }
        let mut it = values.iter();
        for j in y..y + h {
            for i in x..x + w {
                if let Some(&v) = it.next() {
                    self.set_sample(i, j, band, v, db)?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Pixels
    // ========================================================================

    /// All bands of one pixel.
    pub fn pixel(&self, x: i32, y: i32, db: &DataBuffer) -> Result<Vec<i32>> {
        (0..self.num_bands())
            .map(|b| self.sample(x, y, b, db))
            .collect()
    }

    pub fn set_pixel(&self, x: i32, y: i32, values: &[i32], db: &mut DataBuffer) -> Result<()> {
        self.check_pixel_len(values.len(), 1)?;
        for (b, &v) in values.iter().take(self.num_bands()).enumerate() {
            self.set_sample(x, y, b, v, db)?;
        }
        Ok(())
    }

    pub fn pixel_double(&self, x: i32, y: i32, db: &DataBuffer) -> Result<Vec<f64>> {
        (0..self.num_bands())
            .map(|b| self.sample_double(x, y, b, db))
            .collect()
    }

    pub fn set_pixel_double(
        &self,
        x: i32,
        y: i32,
        values: &[f64],
        db: &mut DataBuffer,
    ) -> Result<()> {
        self.check_pixel_len(values.len(), 1)?;
        for (b, &v) in values.iter().take(self.num_bands()).enumerate() {
            self.set_sample_double(x, y, b, v, db)?;
        }
        Ok(())
    }

    fn check_pixel_len(&self, len: usize, pixels: usize) -> Result<()> {
        let need = self.num_bands() * pixels;
        if len < need {
            return Err(Error::out_of_bounds(format!(
                "{len} samples given where {need} are needed"
            )));
        }
        Ok(())
    }

    /// Pixels of a `w` x `h` region, row-major with bands interleaved.
    pub fn pixels(&self, x: i32, y: i32, w: i32, h: i32, db: &DataBuffer) -> Result<Vec<i32>> {
        self.check_region(x, y, w, h)?;
        let mut out = Vec::with_capacity((w as usize) * (h as usize) * self.num_bands());
        for j in y..y + h {
            for i in x..x + w {
                for b in 0..self.num_bands() {
                    out.push(self.sample(i, j, b, db)?);
                }
            }
        }
        Ok(out)
    }

    pub fn set_pixels(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        values: &[i32],
        db: &mut DataBuffer,
    ) -> Result<()> {
        self.check_region(x, y, w, h)?;
        self.check_pixel_len(values.len(), (w as usize) * (h as usize))?;
        let nb = self.num_bands();
        let mut rows = values.chunks(nb);
        for j in y..y + h {
            for i in x..x + w {
                if let Some(px) = rows.next() {
                    for (b, &v) in px.iter().enumerate() {
                        self.set_sample(i, j, b, v, db)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn pixels_double(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        db: &DataBuffer,
    ) -> Result<Vec<f64>> {
        self.check_region(x, y, w, h)?;
        let mut out = Vec::with_capacity((w as usize) * (h as usize) * self.num_bands());
        for j in y..y + h {
            for i in x..x + w {
                for b in 0..self.num_bands() {
                    out.push(self.sample_double(i, j, b, db)?);
                }
            }
        }
        Ok(out)
    }

    pub fn set_pixels_double(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        values: &[f64],
        db: &mut DataBuffer,
    ) -> Result<()> {
        self.check_region(x, y, w, h)?;
        self.check_pixel_len(values.len(), (w as usize) * (h as usize))?;
        let nb = self.num_bands();
        let mut rows = values.chunks(nb);
        for j in y..y + h {
            for i in x..x + w {
                if let Some(px) = rows.next() {
                    for (b, &v) in px.iter().enumerate() {
                        self.set_sample_double(i, j, b, v, db)?;
                    }
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Data elements
    // ========================================================================

    /// One pixel as an array of [`transfer_type`](Self::transfer_type)
    /// elements.
    pub fn data_elements(&self, x: i32, y: i32, db: &DataBuffer) -> Result<TransferData> {
        let (x, y) = self.check_xy(x, y)?;
        each_model!(self, m => m.data_elements(x, y, db))
    }

    /// Store one pixel given as a transfer array. The array type must match
    /// the transfer type and hold at least
    /// [`num_data_elements`](Self::num_data_elements) entries.
    pub fn set_data_elements(
        &self,
        x: i32,
        y: i32,
        data: &TransferData,
        db: &mut DataBuffer,
    ) -> Result<()> {
        if data.data_type() != self.transfer_type() {
            return Err(Error::illegal(format!(
                "transfer array of {:?} where {:?} is expected",
                data.data_type(),
                self.transfer_type()
            )));
        }
        if data.len() < self.num_data_elements() {
            return Err(Error::illegal(format!(
                "transfer array of {} elements where {} are expected",
                data.len(),
                self.num_data_elements()
            )));
        }
        let (x, y) = self.check_xy(x, y)?;
        each_model!(self, m => m.set_data_elements(x, y, data, db))
    }

    // ========================================================================
    // Derived models and buffers
    // ========================================================================

    /// Zero-filled buffer sized for this model.
    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        each_model!(self, m => m.create_data_buffer())
    }

    /// Same kind of layout for a `width` x `height` image.
    pub fn create_compatible_sample_model(&self, width: i32, height: i32) -> Result<SampleModel> {
        Ok(each_model!(self, m => SampleModel::from(m.create_compatible(width, height)?)))
    }

    /// Model exposing only `bands` (in that order) of this one's storage.
    pub fn create_subset_sample_model(&self, bands: &[usize]) -> Result<SampleModel> {
        Ok(each_model!(self, m => SampleModel::from(m.create_subset(bands)?)))
    }
}
