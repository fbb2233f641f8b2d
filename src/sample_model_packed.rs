//! Single-pixel packed sample model.
//!
//! Every pixel occupies exactly one data element; its samples are bit
//! fields selected by per-band masks. The element for `(x, y)` is at
//! `y * scanline_stride + x` in bank 0.

use crate::data_buffer::{DataBuffer, DataType, TransferData};
use crate::error::{Error, Result};
use crate::sample_model_component::check_dims;

/// Validate one bit mask and return its `(offset, size)`.
///
/// A mask must be non-empty, contiguous and fit in `max_bits` bits.
pub(crate) fn mask_layout(mask: u32, max_bits: u32) -> Result<(u32, u32)> {
    if mask == 0 {
        return Ok((0, 0));
    }
    let offset = mask.trailing_zeros();
    let size = mask.count_ones();
    if (mask >> offset).wrapping_add(1) & (mask >> offset) != 0 {
        return Err(Error::illegal(format!("mask {mask:#x} must be contiguous")));
    }
    if offset + size > max_bits {
        return Err(Error::illegal(format!(
            "mask {mask:#x} does not fit in {max_bits} bits"
        )));
    }
    Ok((offset, size))
}

fn check_packed_type(data_type: DataType) -> Result<()> {
    match data_type {
        DataType::Byte | DataType::UShort | DataType::Int => Ok(()),
        other => Err(Error::illegal(format!(
            "packed sample models need an integral type, got {other:?}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinglePixelPackedSampleModel {
    data_type: DataType,
    width: i32,
    height: i32,
    scanline_stride: usize,
    bit_masks: Vec<u32>,
    bit_offsets: Vec<u32>,
    bit_sizes: Vec<u32>,
}

impl SinglePixelPackedSampleModel {
    /// Model with a scanline stride equal to `width`.
    pub fn new(data_type: DataType, width: i32, height: i32, bit_masks: &[u32]) -> Result<Self> {
        Self::with_stride(data_type, width, height, width.max(0) as usize, bit_masks)
    }

    pub fn with_stride(
        data_type: DataType,
        width: i32,
        height: i32,
        scanline_stride: usize,
        bit_masks: &[u32],
    ) -> Result<Self> {
        check_dims(width, height)?;
        check_packed_type(data_type)?;
        if bit_masks.is_empty() {
            return Err(Error::illegal("packed sample model needs at least one mask"));
        }
        let mut bit_offsets = Vec::with_capacity(bit_masks.len());
        let mut bit_sizes = Vec::with_capacity(bit_masks.len());
        for &m in bit_masks {
            let (off, size) = mask_layout(m, data_type.size_in_bits())?;
            bit_offsets.push(off);
            bit_sizes.push(size);
        }
        let sm = Self {
            data_type,
            width,
            height,
            scanline_stride,
            bit_masks: bit_masks.to_vec(),
            bit_offsets,
            bit_sizes,
        };
        if sm.checked_size().is_none() {
            return Err(Error::illegal(format!(
                "scanline stride {scanline_stride} overflows the buffer size for {width}x{height}"
            )));
        }
        Ok(sm)
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
        self.bit_masks.len()
    }

    pub fn scanline_stride(&self) -> usize {
        self.scanline_stride
    }

    pub fn bit_masks(&self) -> &[u32] {
        &self.bit_masks
    }

    pub fn bit_offsets(&self) -> &[u32] {
        &self.bit_offsets
    }

    pub fn sample_size(&self, band: usize) -> u32 {
        self.bit_sizes[band]
    }

    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        y * self.scanline_stride + x
    }

    fn element(&self, x: usize, y: usize, db: &DataBuffer) -> Result<u32> {
        Ok(db.elem(0, self.offset(x, y))? as u32)
    }

    pub(crate) fn sample(&self, x: usize, y: usize, b: usize, db: &DataBuffer) -> Result<i32> {
        let e = self.element(x, y, db)?;
        Ok(((e & self.bit_masks[b]) >> self.bit_offsets[b]) as i32)
    }

    pub(crate) fn set_sample(
        &self,
        x: usize,
        y: usize,
        b: usize,
        s: i32,
        db: &mut DataBuffer,
    ) -> Result<()> {
        let off = self.offset(x, y);
        let mask = self.bit_masks[b];
        let mut e = db.elem(0, off)? as u32;
        e &= !mask;
        e |= ((s as u32) << self.bit_offsets[b]) & mask;
        db.set_elem(0, off, e as i32)
    }

    /// The raw pixel element, in the storage type.
    pub(crate) fn data_elements(
        &self,
        x: usize,
        y: usize,
        db: &DataBuffer,
    ) -> Result<TransferData> {
        let mut out = TransferData::zeroed(self.data_type, 1);
        out.set_int(0, db.elem(0, self.offset(x, y))?)?;
        Ok(out)
    }

    pub(crate) fn set_data_elements(
        &self,
        x: usize,
        y: usize,
        data: &TransferData,
        db: &mut DataBuffer,
    ) -> Result<()> {
        db.set_elem(0, self.offset(x, y), data.get_int(0)?)
    }

    fn checked_size(&self) -> Option<usize> {
        self.scanline_stride
            .checked_mul(self.height as usize - 1)?
            .checked_add(self.width as usize)
    }

    pub(crate) fn buffer_layout(&self) -> (usize, usize) {
        (self.checked_size().unwrap_or(usize::MAX), 1)
    }

    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        DataBuffer::new(self.data_type, self.buffer_layout().0, 1)
    }

    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        Self::new(self.data_type, width, height, &self.bit_masks)
    }

    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        let mut masks = Vec::with_capacity(bands.len());
        for &b in bands {
            let m = self.bit_masks.get(b).ok_or_else(|| {
                Error::illegal(format!("band {b} not in model with {} bands", self.num_bands()))
            })?;
            masks.push(*m);
        }
        Self::with_stride(
            self.data_type,
            self.width,
            self.height,
            self.scanline_stride,
            &masks,
        )
    }
}
