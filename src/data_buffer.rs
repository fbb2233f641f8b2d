//! Sample storage.
//!
//! A [`DataBuffer`] holds one or more equally sized banks of a primitive
//! element type. Each bank has its own offset, so a buffer can expose a
//! window into larger arrays. Single-bank buffers back interleaved and
//! packed layouts; multi-bank buffers back banded (planar) layouts.
//!
//! Elements are read and written as `i32`, `f32` or `f64` regardless of the
//! storage type. Integer conversions follow the storage type's semantics:
//! bytes and unsigned shorts are zero-extended, signed shorts are
//! sign-extended, and narrowing writes keep the low bits.

use crate::error::{Error, Result};

// ============================================================================
// Element types
// ============================================================================

/// Primitive storage type of a buffer or a transfer array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Byte,
    UShort,
    Short,
    Int,
    Float,
    Double,
}

impl DataType {
    pub fn size_in_bits(self) -> u32 {
        match self {
            DataType::Byte => 8,
            DataType::UShort | DataType::Short => 16,
            DataType::Int | DataType::Float => 32,
            DataType::Double => 64,
        }
    }

    pub fn is_floating(self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Smallest unsigned integral type able to hold `bits` bits.
    pub(crate) fn unsigned_for_bits(bits: u32) -> Result<DataType> {
        match bits {
            0..=8 => Ok(DataType::Byte),
            9..=16 => Ok(DataType::UShort),
            17..=32 => Ok(DataType::Int),
            _ => Err(Error::illegal(format!("{bits} bits do not fit a 32-bit pixel"))),
        }
    }
}

/// Conversions between a storage element and the `i32`/`f32`/`f64` views.
pub(crate) trait Element: Copy + Default {
    fn to_i32(self) -> i32;
    fn from_i32(v: i32) -> Self;
    fn to_f32(self) -> f32;
    fn from_f32(v: f32) -> Self;
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

impl Element for u8 {
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(v: i32) -> Self {
        v as u8
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn from_f32(v: f32) -> Self {
        v as i32 as u8
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i32 as u8
    }
}

impl Element for u16 {
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(v: i32) -> Self {
        v as u16
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn from_f32(v: f32) -> Self {
        v as i32 as u16
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i32 as u16
    }
}

impl Element for i16 {
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(v: i32) -> Self {
        v as i16
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn from_f32(v: f32) -> Self {
        v as i32 as i16
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i32 as i16
    }
}

impl Element for i32 {
    fn to_i32(self) -> i32 {
        self
    }
    fn from_i32(v: i32) -> Self {
        v
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn from_f32(v: f32) -> Self {
        v as i32
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i32
    }
}

impl Element for f32 {
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(v: i32) -> Self {
        v as f32
    }
    fn to_f32(self) -> f32 {
        self
    }
    fn from_f32(v: f32) -> Self {
        v
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Element for f64 {
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn from_i32(v: i32) -> Self {
        v as f64
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn from_f32(v: f32) -> Self {
        v as f64
    }
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(v: f64) -> Self {
        v
    }
}

/// Run `$body` with `$v` bound to the typed vector inside any variant of a
/// bank or transfer enum.
macro_rules! with_typed {
    ($enum:ident, $value:expr, $v:ident => $body:expr) => {
        match $value {
            $enum::Byte($v) => $body,
            $enum::UShort($v) => $body,
            $enum::Short($v) => $body,
            $enum::Int($v) => $body,
            $enum::Float($v) => $body,
            $enum::Double($v) => $body,
        }
    };
}

// ============================================================================
// Banks
// ============================================================================

/// Typed bank storage of a [`DataBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Banks {
    Byte(Vec<Vec<u8>>),
    UShort(Vec<Vec<u16>>),
    Short(Vec<Vec<i16>>),
    Int(Vec<Vec<i32>>),
    Float(Vec<Vec<f32>>),
    Double(Vec<Vec<f64>>),
}

impl Banks {
    /// `num_banks` zero-filled banks of `len` elements.
    pub fn zeroed(data_type: DataType, len: usize, num_banks: usize) -> Banks {
        match data_type {
            DataType::Byte => Banks::Byte(vec![vec![0; len]; num_banks]),
            DataType::UShort => Banks::UShort(vec![vec![0; len]; num_banks]),
            DataType::Short => Banks::Short(vec![vec![0; len]; num_banks]),
            DataType::Int => Banks::Int(vec![vec![0; len]; num_banks]),
            DataType::Float => Banks::Float(vec![vec![0.0; len]; num_banks]),
            DataType::Double => Banks::Double(vec![vec![0.0; len]; num_banks]),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Banks::Byte(_) => DataType::Byte,
            Banks::UShort(_) => DataType::UShort,
            Banks::Short(_) => DataType::Short,
            Banks::Int(_) => DataType::Int,
            Banks::Float(_) => DataType::Float,
            Banks::Double(_) => DataType::Double,
        }
    }

    pub fn num_banks(&self) -> usize {
        with_typed!(Banks, self, b => b.len())
    }

    fn bank_len(&self, bank: usize) -> usize {
        with_typed!(Banks, self, b => b[bank].len())
    }
}

// ============================================================================
// DataBuffer
// ============================================================================

/// Banked sample storage with per-bank offsets.
///
/// Invariant: for every bank, `offset + size <= bank length`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBuffer {
    banks: Banks,
    size: usize,
    offsets: Vec<usize>,
}

impl DataBuffer {
    /// Zero-filled buffer of `num_banks` banks holding `size` elements each.
    pub fn new(data_type: DataType, size: usize, num_banks: usize) -> Result<Self> {
        if num_banks == 0 {
            return Err(Error::illegal("data buffer needs at least one bank"));
        }
        Ok(Self {
            banks: Banks::zeroed(data_type, size, num_banks),
            size,
            offsets: vec![0; num_banks],
        })
    }

    /// Wrap existing banks. Each bank exposes `size` elements starting at
    /// its offset.
    pub fn from_banks(banks: Banks, size: usize, offsets: Vec<usize>) -> Result<Self> {
        let n = banks.num_banks();
        if n == 0 {
            return Err(Error::illegal("data buffer needs at least one bank"));
        }
        if offsets.len() != n {
            return Err(Error::illegal(format!(
                "{} offsets given for {n} banks",
                offsets.len()
            )));
        }
        for (bank, &off) in offsets.iter().enumerate() {
            let len = banks.bank_len(bank);
            if off.checked_add(size).map_or(true, |end| end > len) {
                return Err(Error::illegal(format!(
                    "bank {bank}: offset {off} + size {size} exceeds length {len}"
                )));
            }
        }
        Ok(Self {
            banks,
            size,
            offsets,
        })
    }

    /// Single byte bank using the whole vector.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let size = data.len();
        Self {
            banks: Banks::Byte(vec![data]),
            size,
            offsets: vec![0],
        }
    }

    /// Single int bank using the whole vector.
    pub fn from_ints(data: Vec<i32>) -> Self {
        let size = data.len();
        Self {
            banks: Banks::Int(vec![data]),
            size,
            offsets: vec![0],
        }
    }

    pub fn data_type(&self) -> DataType {
        self.banks.data_type()
    }

    pub fn num_banks(&self) -> usize {
        self.offsets.len()
    }

    /// Elements addressable in each bank.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Offset of bank 0.
    pub fn offset(&self) -> usize {
        self.offsets[0]
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn banks(&self) -> &Banks {
        &self.banks
    }

    fn locate(&self, bank: usize, i: usize) -> Result<usize> {
        if bank >= self.num_banks() {
            return Err(Error::out_of_bounds(format!(
                "bank {bank} of {}",
                self.num_banks()
            )));
        }
        if i >= self.size {
            return Err(Error::out_of_bounds(format!(
                "element {i} of {} in bank {bank}",
                self.size
            )));
        }
        Ok(self.offsets[bank] + i)
    }

    pub fn elem(&self, bank: usize, i: usize) -> Result<i32> {
        let idx = self.locate(bank, i)?;
        Ok(with_typed!(Banks, &self.banks, b => b[bank][idx].to_i32()))
    }

    pub fn set_elem(&mut self, bank: usize, i: usize, v: i32) -> Result<()> {
        let idx = self.locate(bank, i)?;
        with_typed!(Banks, &mut self.banks, b => b[bank][idx] = Element::from_i32(v));
        Ok(())
    }

    pub fn elem_float(&self, bank: usize, i: usize) -> Result<f32> {
        let idx = self.locate(bank, i)?;
        Ok(with_typed!(Banks, &self.banks, b => b[bank][idx].to_f32()))
    }

    pub fn set_elem_float(&mut self, bank: usize, i: usize, v: f32) -> Result<()> {
        let idx = self.locate(bank, i)?;
        with_typed!(Banks, &mut self.banks, b => b[bank][idx] = Element::from_f32(v));
        Ok(())
    }

    pub fn elem_double(&self, bank: usize, i: usize) -> Result<f64> {
        let idx = self.locate(bank, i)?;
        Ok(with_typed!(Banks, &self.banks, b => b[bank][idx].to_f64()))
    }

    pub fn set_elem_double(&mut self, bank: usize, i: usize, v: f64) -> Result<()> {
        let idx = self.locate(bank, i)?;
        with_typed!(Banks, &mut self.banks, b => b[bank][idx] = Element::from_f64(v));
        Ok(())
    }
}

// ============================================================================
// Transfer arrays
// ============================================================================

/// One pixel's raw data elements, typed by the sample model's transfer
/// type.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferData {
    Byte(Vec<u8>),
    UShort(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl TransferData {
    /// Zero-filled array of `len` elements.
    pub fn zeroed(data_type: DataType, len: usize) -> TransferData {
        match data_type {
            DataType::Byte => TransferData::Byte(vec![0; len]),
            DataType::UShort => TransferData::UShort(vec![0; len]),
            DataType::Short => TransferData::Short(vec![0; len]),
            DataType::Int => TransferData::Int(vec![0; len]),
            DataType::Float => TransferData::Float(vec![0.0; len]),
            DataType::Double => TransferData::Double(vec![0.0; len]),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            TransferData::Byte(_) => DataType::Byte,
            TransferData::UShort(_) => DataType::UShort,
            TransferData::Short(_) => DataType::Short,
            TransferData::Int(_) => DataType::Int,
            TransferData::Float(_) => DataType::Float,
            TransferData::Double(_) => DataType::Double,
        }
    }

    pub fn len(&self) -> usize {
        with_typed!(TransferData, self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, i: usize) -> Result<()> {
        if i >= self.len() {
            return Err(Error::out_of_bounds(format!(
                "transfer element {i} of {}",
                self.len()
            )));
        }
        Ok(())
    }

    pub fn get_int(&self, i: usize) -> Result<i32> {
        self.check(i)?;
        Ok(with_typed!(TransferData, self, v => v[i].to_i32()))
    }

    pub fn set_int(&mut self, i: usize, value: i32) -> Result<()> {
        self.check(i)?;
        with_typed!(TransferData, self, v => v[i] = Element::from_i32(value));
        Ok(())
    }

    pub fn get_float(&self, i: usize) -> Result<f32> {
        self.check(i)?;
        Ok(with_typed!(TransferData, self, v => v[i].to_f32()))
    }

    pub fn set_float(&mut self, i: usize, value: f32) -> Result<()> {
        self.check(i)?;
        with_typed!(TransferData, self, v => v[i] = Element::from_f32(value));
        Ok(())
    }

    pub fn get_double(&self, i: usize) -> Result<f64> {
        self.check(i)?;
        Ok(with_typed!(TransferData, self, v => v[i].to_f64()))
    }

    pub fn set_double(&mut self, i: usize, value: f64) -> Result<()> {
        self.check(i)?;
        with_typed!(TransferData, self, v => v[i] = Element::from_f64(value));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(DataType::Byte.size_in_bits(), 8);
        assert_eq!(DataType::Short.size_in_bits(), 16);
        assert_eq!(DataType::Float.size_in_bits(), 32);
        assert_eq!(DataType::Double.size_in_bits(), 64);
        assert!(DataType::Double.is_floating());
        assert_eq!(DataType::unsigned_for_bits(4).unwrap(), DataType::Byte);
        assert_eq!(DataType::unsigned_for_bits(12).unwrap(), DataType::UShort);
        assert_eq!(DataType::unsigned_for_bits(24).unwrap(), DataType::Int);
        assert!(DataType::unsigned_for_bits(40).is_err());
    }

    #[test]
    fn test_byte_zero_extends_and_truncates() {
        let mut db = DataBuffer::new(DataType::Byte, 4, 1).unwrap();
        db.set_elem(0, 1, 0x1ff).unwrap();
        assert_eq!(db.elem(0, 1).unwrap(), 0xff);
        db.set_elem(0, 2, -1).unwrap();
        assert_eq!(db.elem(0, 2).unwrap(), 255);
        assert_eq!(db.elem_float(0, 2).unwrap(), 255.0);
    }

    #[test]
    fn test_short_sign_extends() {
        let mut s = DataBuffer::new(DataType::Short, 2, 1).unwrap();
        s.set_elem(0, 0, 0xffff).unwrap();
        assert_eq!(s.elem(0, 0).unwrap(), -1);

        let mut u = DataBuffer::new(DataType::UShort, 2, 1).unwrap();
        u.set_elem(0, 0, 0xffff).unwrap();
        assert_eq!(u.elem(0, 0).unwrap(), 0xffff);
    }

    #[test]
    fn test_float_storage_truncates_on_int_read() {
        let mut f = DataBuffer::new(DataType::Float, 2, 1).unwrap();
        f.set_elem_double(0, 0, 2.75).unwrap();
        assert_eq!(f.elem(0, 0).unwrap(), 2);
        assert_eq!(f.elem_float(0, 0).unwrap(), 2.75);

        let mut d = DataBuffer::new(DataType::Double, 1, 1).unwrap();
        d.set_elem(0, 0, 7).unwrap();
        assert_eq!(d.elem_double(0, 0).unwrap(), 7.0);
        d.set_elem_float(0, 0, -1.5).unwrap();
        assert_eq!(d.elem(0, 0).unwrap(), -1);
    }

    #[test]
    fn test_offsets_and_banks() {
        let banks = Banks::Int(vec![vec![0, 1, 2, 3, 4], vec![10, 11, 12, 13, 14]]);
        let db = DataBuffer::from_banks(banks, 3, vec![2, 0]).unwrap();
        assert_eq!(db.num_banks(), 2);
        assert_eq!(db.offset(), 2);
        assert_eq!(db.elem(0, 0).unwrap(), 2);
        assert_eq!(db.elem(1, 2).unwrap(), 12);
        assert!(matches!(db.elem(0, 3), Err(Error::IndexOutOfBounds(_))));
        assert!(matches!(db.elem(2, 0), Err(Error::IndexOutOfBounds(_))));
    }

    #[test]
    fn test_from_banks_validates() {
        let banks = Banks::Byte(vec![vec![0; 4]]);
        assert!(DataBuffer::from_banks(banks.clone(), 3, vec![2]).is_err());
        assert!(DataBuffer::from_banks(banks.clone(), 3, vec![0, 0]).is_err());
        assert!(DataBuffer::from_banks(banks, 4, vec![0]).is_ok());
        assert!(DataBuffer::new(DataType::Int, 4, 0).is_err());
    }

    #[test]
    fn test_from_banks_rejects_overflowing_extent() {
        let banks = Banks::Byte(vec![vec![0; 4]]);
        assert!(matches!(
            DataBuffer::from_banks(banks.clone(), usize::MAX, vec![1]),
            Err(Error::IllegalArgument(_))
        ));
        assert!(DataBuffer::from_banks(banks, 1, vec![usize::MAX]).is_err());
    }

    #[test]
    fn test_transfer_data() {
        let mut t = TransferData::zeroed(DataType::Byte, 3);
        assert_eq!(t.len(), 3);
        assert_eq!(t.data_type(), DataType::Byte);
        t.set_int(0, 300).unwrap();
        assert_eq!(t.get_int(0).unwrap(), 44);
        assert!(t.get_int(3).is_err());

        let mut f = TransferData::zeroed(DataType::Float, 1);
        f.set_double(0, 0.25).unwrap();
        assert_eq!(f.get_float(0).unwrap(), 0.25);
        assert!(TransferData::Int(Vec::new()).is_empty());
    }
}
