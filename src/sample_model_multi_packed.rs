//! Multi-pixel packed sample model.
//!
//! Single-band pixels of 1, 2, 4 (or more) bits packed several to a data
//! element, most significant bits first. Used for bilevel and small-palette
//! images.

use crate::data_buffer::{DataBuffer, DataType, TransferData};
use crate::error::{Error, Result};
use crate::sample_model_component::check_dims;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPixelPackedSampleModel {
    data_type: DataType,
    width: i32,
    height: i32,
    pixel_bit_stride: u32,
    bit_mask: u32,
    scanline_stride: usize,
    data_bit_offset: usize,
}

impl MultiPixelPackedSampleModel {
    /// Model with tightly packed rows and no leading bit offset.
    pub fn new(data_type: DataType, width: i32, height: i32, bits: u32) -> Result<Self> {
        let elem_bits = data_type.size_in_bits() as usize;
        let row_bits = width.max(0) as usize * bits as usize;
        let scanline = (row_bits + elem_bits - 1) / elem_bits;
        Self::with_layout(data_type, width, height, bits, scanline, 0)
    }

    /// Model with an explicit scanline stride (in elements) and a bit offset
    /// of the first pixel.
    pub fn with_layout(
        data_type: DataType,
        width: i32,
        height: i32,
        bits: u32,
        scanline_stride: usize,
        data_bit_offset: usize,
    ) -> Result<Self> {
        check_dims(width, height)?;
        if !matches!(data_type, DataType::Byte | DataType::UShort | DataType::Int) {
            return Err(Error::illegal(format!(
                "multi-pixel packing needs an integral type, got {data_type:?}"
            )));
        }
        let elem_bits = data_type.size_in_bits();
        if bits == 0 || elem_bits % bits != 0 {
            return Err(Error::illegal(format!(
                "{bits} bits per pixel must evenly divide the {elem_bits}-bit element"
            )));
        }
        if data_bit_offset % bits as usize != 0 {
            return Err(Error::illegal(format!(
                "data bit offset {data_bit_offset} is not a multiple of {bits}"
            )));
        }
        let sm = Self {
            data_type,
            width,
            height,
            pixel_bit_stride: bits,
            bit_mask: if bits == 32 { u32::MAX } else { (1 << bits) - 1 },
            scanline_stride,
            data_bit_offset,
        };
        if sm.checked_size().is_none() {
            return Err(Error::illegal(format!(
                "layout {scanline_stride}/{data_bit_offset} overflows the buffer size for \
                 {width}x{height}"
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

    pub fn pixel_bit_stride(&self) -> u32 {
        self.pixel_bit_stride
    }

    pub fn scanline_stride(&self) -> usize {
        self.scanline_stride
    }

    pub fn data_bit_offset(&self) -> usize {
        self.data_bit_offset
    }

    /// Transfer type sized to hold one pixel.
    pub fn transfer_type(&self) -> DataType {
        match self.pixel_bit_stride {
            0..=8 => DataType::Byte,
            9..=16 => DataType::UShort,
            _ => DataType::Int,
        }
    }

    fn elem_bits(&self) -> usize {
        self.data_type.size_in_bits() as usize
    }

    /// Element holding pixel `(x, y)`.
    pub fn offset(&self, x: usize, y: usize) -> usize {
        let bit = self.data_bit_offset + x * self.pixel_bit_stride as usize;
        y.saturating_mul(self.scanline_stride)
            .saturating_add(bit / self.elem_bits())
    }

    /// Bit position of pixel `x` within its element, counted from the most
    /// significant end.
    pub fn bit_offset(&self, x: usize) -> usize {
        (self.data_bit_offset + x * self.pixel_bit_stride as usize) % self.elem_bits()
    }

    fn shift(&self, x: usize) -> u32 {
        (self.elem_bits() - self.bit_offset(x) - self.pixel_bit_stride as usize) as u32
    }

    pub(crate) fn sample(&self, x: usize, y: usize, db: &DataBuffer) -> Result<i32> {
        let e = db.elem(0, self.offset(x, y))? as u32;
        Ok(((e >> self.shift(x)) & self.bit_mask) as i32)
    }

    pub(crate) fn set_sample(&self, x: usize, y: usize, s: i32, db: &mut DataBuffer) -> Result<()> {
        let off = self.offset(x, y);
        let shift = self.shift(x);
        let mut e = db.elem(0, off)? as u32;
        e &= !(self.bit_mask << shift);
        e |= (s as u32 & self.bit_mask) << shift;
        db.set_elem(0, off, e as i32)
    }

    pub(crate) fn data_elements(
        &self,
        x: usize,
        y: usize,
        db: &DataBuffer,
    ) -> Result<TransferData> {
        let mut out = TransferData::zeroed(self.transfer_type(), 1);
        out.set_int(0, self.sample(x, y, db)?)?;
        Ok(out)
    }

    pub(crate) fn set_data_elements(
        &self,
        x: usize,
        y: usize,
        data: &TransferData,
        db: &mut DataBuffer,
    ) -> Result<()> {
        self.set_sample(x, y, data.get_int(0)?, db)
    }

    /// Elements needed, or `None` when the layout overflows. Also bounds
    /// the bit position of the last pixel in a row.
    fn checked_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.pixel_bit_stride as usize)?
            .checked_add(self.data_bit_offset)?;
        let eb = self.elem_bits();
        let lead = self.data_bit_offset / eb + usize::from(self.data_bit_offset % eb != 0);
        self.scanline_stride
            .checked_mul(self.height as usize)?
            .checked_add(lead)
    }

    pub(crate) fn buffer_layout(&self) -> (usize, usize) {
        (self.checked_size().unwrap_or(usize::MAX), 1)
    }

    pub fn create_data_buffer(&self) -> Result<DataBuffer> {
        DataBuffer::new(self.data_type, self.buffer_layout().0, 1)
    }

    pub fn create_compatible(&self, width: i32, height: i32) -> Result<Self> {
        Self::new(self.data_type, width, height, self.pixel_bit_stride)
    }

    /// Only the single band `[0]` is a valid subset.
    pub fn create_subset(&self, bands: &[usize]) -> Result<Self> {
        if bands != [0] {
            return Err(Error::illegal(format!(
                "multi-pixel packed models have one band, requested {bands:?}"
            )));
        }
        Ok(self.clone())
    }
}
