//! Component sample model: one data element per sample.
//!
//! Covers both pixel-interleaved layouts (all bands in one bank, adjacent
//! per pixel) and banded layouts (one bank per band). A sample lives at
//!
//! ```text
//! bank   = bank_indices[band]
//! offset = y * scanline_stride + x * pixel_stride + band_offsets[band]
//! ```

use crate::data_buffer::{DataBuffer, DataType, TransferData};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSampleModel {
    data_type: DataType,
    width: i32,
    height: i32,
    pixel_stride: usize,
    scanline_stride: usize,
    bank_indices: Vec<usize>,
    band_offsets: Vec<usize>,
}

pub(crate) fn check_dims(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(Error::illegal(format!(
            "width ({width}) and height ({height}) must be > 0"
        )));
    }
    if (width as i64) * (height as i64) > i32::MAX as i64 {
        return Err(Error::illegal(format!(
            "dimensions {width}x{height} overflow the sample count"
        )));
    }
    Ok(())
}

impl ComponentSampleModel {
    /// General constructor with explicit bank per band.
    pub fn new(
        data_type: DataType,
        width: i32,
        height: i32,
        pixel_stride: usize,
        scanline_stride: usize,
        bank_indices: Vec<usize>,
        band_offsets: Vec<usize>,
    ) -> Result<Self> {
        check_dims(width, height)?;
        if band_offsets.is_empty() {
            return Err(Error::illegal("sample model needs at least one band"));
        }
        if bank_indices.len() != band_offsets.len() {
            return Err(Error::illegal(format!(
                "{} bank indices for {} bands",
                bank_indices.len(),
                band_offsets.len()
            )));
        }
        let sm = Self {
            data_type,
            width,
            height,
            pixel_stride,
            scanline_stride,
            bank_indices,
            band_offsets,
        };
        if sm.checked_layout().is_none() {
            return Err(Error::illegal(format!(
                "strides {pixel_stride}/{scanline_stride} overflow the buffer size for \
                 {width}x{height}"
            )));
        }
        Ok(sm)
    }

    /// All bands in bank 0, interleaved per pixel.
    pub fn pixel_interleaved(
        data_type: DataType,
        width: i32,
        height: i32,
        pixel_stride: usize,
        scanline_stride: usize,
        band_offsets: Vec<usize>,
    ) -> Result<Self> {
        let banks = vec![0; band_offsets.len()];
        Self::new(
            data_type,
            width,
            height,
            pixel_stride,
            scanline_stride,
            banks,
            band_offsets,
        )
    }

    /// One bank per band, each a plain `width`-wide plane.
    pub fn banded(data_type: DataType, width: i32, height: i32, num_bands: usize) -> Result<Self> {
        Self::new(
            data_type,
            width,
            height,
            1,
            width.max(0) as usize,
            (0..num_bands).collect(),
            vec![0; num_bands],
        )
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn num_bands(&self) -> usize {
        self.band_offsets.len()
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    pub fn scanline_stride(&self) -> usize {
        self.scanline_stride
    }

    pub fn bank_indices(&self) -> &[usize] {
        &self.bank_indices
    }

    pub fn band_offsets(&self) -> &[usize] {
        &self.band_offsets
    }

    /// `true` when bands live in more than one bank.
    pub fn is_banded(&self) -> bool {
        self.bank_indices.iter().any(|&b| b != self.bank_indices[0])
    }

    /// Element offset of `band` at `(x, y)` within its bank.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, band: usize) -> usize {
        y * self.scanline_stride + x * self.pixel_stride + self.band_offsets[band]
    }

    pub(crate) fn sample(&self, x: usize, y: usize, b: usize, db: &DataBuffer) -> Result<i32> {
        db.elem(self.bank_indices[b], self.offset(x, y, b))
    }

    pub(crate) fn set_sample(
        &self,
        x: usize,
        y: usize,
        b: usize,
        v: i32,
        db: &mut DataBuffer,
    ) -> Result<()> {
        db.set_elem(self.bank_indices[b], self.offset(x, y, b), v)
    }

    pub(crate) fn sample_double(
        &self,
        x: usize,
        y: usize,
        b: usize,
        db: &DataBuffer,
    ) -> Result<f64> {
        db.elem_double(self.bank_indices[b], self.offset(x, y, b))
    }

    pub(crate) fn set_sample_double(
        &self,
        x: usize,
        y: usize,
        b: usize,
        v: f64,
        db: &mut DataBuffer,
    ) -> Result<()> {
        db.set_elem_double(self.bank_indices[b], self.offset(x, y, b), v)
    }

    /// One element per band, in the storage type.
    pub(crate) fn data_elements(
        &self,
        x: usize,
        y: usize,
        db: &DataBuffer,
    ) -> Result<TransferData> {
        let mut out = TransferData::zeroed(self.data_type, self.num_bands());
        for b in 0..self.num_bands() {
            out.set_double(b, self.sample_double(x, y, b, db)?)?;
        }
        Ok(out)
    }

    pub(crate) fn set_data_elements(
        &self,
        x: usize,
        y: usize,
        data: &TransferData,
        db: &mut DataBuffer,
    ) -> Result<()> {
        for b in 0..self.num_bands() {
            self.set_sample_double(x, y, b, data.get_double(b)?, db)?;
        }
        Ok(())
    }

    /// Elements per bank and number of banks needed to hold the model.
    /// Buffer size and bank count, or `None` when the layout overflows.
    fn checked_layout(&self) -> Option<(usize, usize)> {
        let max_band = self.band_offsets.iter().copied().max().unwrap_or(0);
        let size = self
            .scanline_stride
            .checked_mul(self.height as usize - 1)?
            .checked_add(self.pixel_stride.checked_mul(self.width as usize - 1)?)?
            .checked_add(max_band)?
            .checked_add(1)?;
        let banks = self.bank_indices.iter().copied().max().unwrap_or(0).checked_add(1)?;
        Some((size, banks))
    }

    /// Checked at construction, so every in-bounds offset fits `usize`.
    pub(crate) fn buffer_layout(&self) -> (usize, usize) {
        self.checked_layout().unwrap_or((usize::MAX, usize::MAX))
    }

    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        let (size, banks) = self.buffer_layout();
        DataBuffer::new(self.data_type, size, banks)
    }

    /// Same band layout, tightly packed for a `width` x `height` image.
    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        check_dims(width, height)?;
        if self.is_banded() {
            return Self::new(
                self.data_type,
                width,
                height,
                1,
                width as usize,
                self.bank_indices.clone(),
                vec![0; self.num_bands()],
            );
        }
        let min = self.band_offsets.iter().copied().min().unwrap_or(0);
        let offsets: Vec<usize> = self.band_offsets.iter().map(|o| o - min).collect();
        let span = offsets.iter().copied().max().unwrap_or(0) + 1;
        let pixel_stride = self.pixel_stride.max(span);
        Self::pixel_interleaved(
            self.data_type,
            width,
            height,
            pixel_stride,
            pixel_stride
                .checked_mul(width as usize)
                .ok_or_else(|| Error::illegal("scanline stride overflows"))?,
            offsets,
        )
    }

    /// Model over the listed bands of this one, sharing its layout.
    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        let mut banks = Vec::with_capacity(bands.len());
        let mut offsets = Vec::with_capacity(bands.len());
        for &b in bands {
            if b >= self.num_bands() {
                return Err(Error::illegal(format!(
                    "band {b} not in model with {} bands",
                    self.num_bands()
                )));
            }
            banks.push(self.bank_indices[b]);
            offsets.push(self.band_offsets[b]);
        }
        Self::new(
            self.data_type,
            self.width,
            self.height,
            self.pixel_stride,
            self.scanline_stride,
            banks,
            offsets,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_dims() {
        assert!(ComponentSampleModel::banded(DataType::Byte, 0, 4, 3).is_err());
        assert!(ComponentSampleModel::banded(DataType::Byte, 4, -1, 3).is_err());
        assert!(
            ComponentSampleModel::pixel_interleaved(DataType::Byte, 2, 2, 3, 6, vec![]).is_err()
        );
        assert!(
            ComponentSampleModel::new(DataType::Byte, 2, 2, 1, 2, vec![0], vec![0, 1]).is_err()
        );
    }

    #[test]
    fn test_overflowing_strides_rejected() {
        let huge = ComponentSampleModel::pixel_interleaved(
            DataType::Byte,
            4,
            4,
            1,
            usize::MAX / 2,
            vec![0],
        );
        assert!(matches!(huge, Err(Error::IllegalArgument(_))));
        let bank = ComponentSampleModel::new(DataType::Byte, 1, 1, 1, 1, vec![usize::MAX], vec![0]);
        assert!(bank.is_err());
        let wide = ComponentSampleModel::pixel_interleaved(
            DataType::Byte,
            2,
            1,
            usize::MAX / 2,
            usize::MAX / 2,
            vec![0],
        )
        .unwrap();
        assert!(wide.create_compatible(4, 1).is_err());
    }

    #[test]
    fn test_interleaved_offsets_and_size() {
        // BGR order in memory.
        let sm =
            ComponentSampleModel::pixel_interleaved(DataType::Byte, 4, 3, 3, 12, vec![2, 1, 0])
                .unwrap();
        assert_eq!(sm.offset(1, 2, 0), 2 * 12 + 3 + 2);
        let db = sm.create_data_buffer().unwrap();
        assert_eq!(db.size(), 36);
        assert_eq!(db.num_banks(), 1);
        assert!(!sm.is_banded());
    }

    #[test]
    fn test_banded_layout() {
        let sm = ComponentSampleModel::banded(DataType::UShort, 5, 2, 3).unwrap();
        assert!(sm.is_banded());
        let mut db = sm.create_data_buffer().unwrap();
        assert_eq!(db.num_banks(), 3);
        assert_eq!(db.size(), 10);
        sm.set_sample(4, 1, 2, 777, &mut db).unwrap();
        assert_eq!(db.elem(2, 9).unwrap(), 777);
        assert_eq!(sm.sample(4, 1, 2, &db).unwrap(), 777);
    }

    #[test]
    fn test_data_elements_round_trip() {
        let sm = ComponentSampleModel::pixel_interleaved(DataType::Float, 2, 2, 2, 4, vec![0, 1])
            .unwrap();
        let mut db = sm.create_data_buffer().unwrap();
        sm.set_data_elements(1, 1, &TransferData::Float(vec![0.5, 0.25]), &mut db)
            .unwrap();
        assert_eq!(
            sm.data_elements(1, 1, &db).unwrap(),
            TransferData::Float(vec![0.5, 0.25])
        );
    }

    #[test]
    fn test_compatible_and_subset() {
        let sm =
            ComponentSampleModel::pixel_interleaved(DataType::Byte, 4, 4, 4, 20, vec![5, 6, 7])
                .unwrap();
        let c = sm.create_compatible(2, 2).unwrap();
        assert_eq!(c.band_offsets(), &[0, 1, 2]);
        assert_eq!(c.pixel_stride(), 4);
        assert_eq!(c.scanline_stride(), 8);

        let s = sm.create_subset(&[2, 0]).unwrap();
        assert_eq!(s.band_offsets(), &[7, 5]);
        assert_eq!(s.num_bands(), 2);
        assert!(sm.create_subset(&[3]).is_err());
    }
}
