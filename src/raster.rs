//! Rasters: a sample model paired with shared storage and a placement.
//!
//! A [`Raster`] covers the rectangle `(min_x, min_y, width, height)` of
//! image space. Raster coordinates map to sample model coordinates by
//! subtracting `sample_model_translate`, so a child raster can expose a
//! window of its parent (optionally moved to a new origin) while reading
//! and writing the very same [`DataBuffer`].
//!
//! Storage is held as `Rc<RefCell<DataBuffer>>`: children clone the `Rc`,
//! and writes through any [`WritableRaster`] over that buffer are visible
//! to all of them. [`Raster`] itself has no setters.

use std::cell::{Ref, RefCell};
use std::ops::Deref;
use std::rc::Rc;

use crate::data_buffer::{DataBuffer, DataType, TransferData};
use crate::error::{Error, Result};
use crate::rectangle::Rectangle;
use crate::sample_model::{
    ComponentSampleModel, MultiPixelPackedSampleModel, SampleModel, SinglePixelPackedSampleModel,
};

// ============================================================================
// Raster
// ============================================================================

/// Read-only view of pixel storage.
#[derive(Debug, Clone)]
pub struct Raster {
    sample_model: SampleModel,
    data_buffer: Rc<RefCell<DataBuffer>>,
    min_x: i32,
    min_y: i32,
    width: i32,
    height: i32,
    sample_model_translate_x: i32,
    sample_model_translate_y: i32,
}

impl Raster {
    /// Raster over `data_buffer` with its upper-left corner at `origin`.
    /// The raster covers the whole sample model.
    pub fn new(
        sample_model: SampleModel,
        data_buffer: DataBuffer,
        origin: (i32, i32),
    ) -> Result<Self> {
        let bounds = Rectangle::new(
            origin.0,
            origin.1,
            sample_model.width(),
            sample_model.height(),
        );
        Self::with_shared(
            sample_model,
            Rc::new(RefCell::new(data_buffer)),
            bounds,
            origin,
        )
    }

    pub(crate) fn with_shared(
        sample_model: SampleModel,
        data_buffer: Rc<RefCell<DataBuffer>>,
        bounds: Rectangle,
        translate: (i32, i32),
    ) -> Result<Self> {
        if bounds.width <= 0 || bounds.height <= 0 {
            return Err(Error::RasterFormat(format!(
                "raster size {}x{} must be positive",
                bounds.width, bounds.height
            )));
        }
        if bounds.x.checked_add(bounds.width).is_none()
            || bounds.y.checked_add(bounds.height).is_none()
        {
            return Err(Error::RasterFormat(format!(
                "raster bounds {bounds:?} overflow the coordinate space"
            )));
        }
        if !sample_model.is_compatible_buffer(&data_buffer.borrow()) {
            return Err(Error::RasterFormat(format!(
                "{:?} buffer cannot back a {}x{} {:?} sample model",
                data_buffer.borrow().data_type(),
                sample_model.width(),
                sample_model.height(),
                sample_model.data_type()
            )));
        }
        Ok(Self {
            sample_model,
            data_buffer,
            min_x: bounds.x,
            min_y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            sample_model_translate_x: translate.0,
            sample_model_translate_y: translate.1,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.min_x, self.min_y, self.width, self.height)
    }

    pub fn sample_model_translate_x(&self) -> i32 {
        self.sample_model_translate_x
    }

    pub fn sample_model_translate_y(&self) -> i32 {
        self.sample_model_translate_y
    }

    pub fn sample_model(&self) -> &SampleModel {
        &self.sample_model
    }

    pub fn num_bands(&self) -> usize {
        self.sample_model.num_bands()
    }

    pub fn num_data_elements(&self) -> usize {
        self.sample_model.num_data_elements()
    }

    pub fn transfer_type(&self) -> DataType {
        self.sample_model.transfer_type()
    }

    /// Shared handle to the storage.
    pub fn data_buffer(&self) -> Rc<RefCell<DataBuffer>> {
        Rc::clone(&self.data_buffer)
    }

    /// `true` if `other` reads and writes the same storage.
    pub fn shares_buffer_with(&self, other: &Raster) -> bool {
        Rc::ptr_eq(&self.data_buffer, &other.data_buffer)
    }

    fn buffer(&self) -> Ref<'_, DataBuffer> {
        self.data_buffer.borrow()
    }

    // ========================================================================
    // Coordinate mapping
    // ========================================================================

    fn to_model(&self, x: i32, y: i32) -> Result<(i32, i32)> {
        if !self.bounds().contains(x, y) {
            return Err(Error::out_of_bounds(format!(
                "({x}, {y}) outside raster {:?}",
                self.bounds()
            )));
        }
        Ok((
            x - self.sample_model_translate_x,
            y - self.sample_model_translate_y,
        ))
    }

    fn region_to_model(&self, x: i32, y: i32, w: i32, h: i32) -> Result<(i32, i32)> {
        let r = Rectangle::new(x, y, w, h);
        if w < 0 || h < 0 || (!r.is_empty() && !self.bounds().contains_rect(&r)) {
            return Err(Error::out_of_bounds(format!(
                "region {r:?} outside raster {:?}",
                self.bounds()
            )));
        }
        // An empty region skips the containment test, so its corner may
        // lie anywhere.
        match (
            x.checked_sub(self.sample_model_translate_x),
            y.checked_sub(self.sample_model_translate_y),
        ) {
            (Some(mx), Some(my)) => Ok((mx, my)),
            _ => Err(Error::out_of_bounds(format!(
                "region {r:?} outside raster {:?}",
                self.bounds()
            ))),
        }
    }

    // ========================================================================
    // Children
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn child_parts(
        &self,
        parent_x: i32,
        parent_y: i32,
        width: i32,
        height: i32,
        child_min_x: i32,
        child_min_y: i32,
        bands: Option<&[usize]>,
    ) -> Result<(SampleModel, Rectangle, (i32, i32))> {
        let window = Rectangle::new(parent_x, parent_y, width, height);
        if width <= 0 || height <= 0 || !self.bounds().contains_rect(&window) {
            return Err(Error::RasterFormat(format!(
                "child window {window:?} is not inside parent {:?}",
                self.bounds()
            )));
        }
        let dx = child_min_x as i64 - parent_x as i64;
        let dy = child_min_y as i64 - parent_y as i64;
        let tx = self.sample_model_translate_x as i64 + dx;
        let ty = self.sample_model_translate_y as i64 + dy;
        let (Ok(tx), Ok(ty)) = (i32::try_from(tx), i32::try_from(ty)) else {
            return Err(Error::RasterFormat(format!(
                "child origin ({child_min_x}, {child_min_y}) overflows the coordinate space"
            )));
        };
        let sample_model = match bands {
            Some(b) => self.sample_model.create_subset_sample_model(b)?,
            None => self.sample_model.clone(),
        };
        let bounds = Rectangle::new(child_min_x, child_min_y, width, height);
        Ok((sample_model, bounds, (tx, ty)))
    }

    /// Read-only raster over the `width` x `height` window at
    /// `(parent_x, parent_y)` of this one, placed at
    /// `(child_min_x, child_min_y)`, optionally restricted to `bands`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_child(
        &self,
        parent_x: i32,
        parent_y: i32,
        width: i32,
        height: i32,
        child_min_x: i32,
        child_min_y: i32,
        bands: Option<&[usize]>,
    ) -> Result<Raster> {
        let (sm, bounds, translate) = self.child_parts(
            parent_x,
            parent_y,
            width,
            height,
            child_min_x,
            child_min_y,
            bands,
        )?;
        Raster::with_shared(sm, Rc::clone(&self.data_buffer), bounds, translate)
    }

    /// The whole raster moved to a new origin.
    pub fn create_translated_child(&self, child_min_x: i32, child_min_y: i32) -> Result<Raster> {
        self.create_child(
            self.min_x,
            self.min_y,
            self.width,
            self.height,
            child_min_x,
            child_min_y,
            None,
        )
    }

    /// Writable raster with the same layout and size, fresh storage, at
    /// `origin`.
    pub fn create_compatible_writable_raster(&self, origin: (i32, i32)) -> Result<WritableRaster> {
        let sm = self
            .sample_model
            .create_compatible_sample_model(self.width, self.height)?;
        let db = sm.create_data_buffer()?;
        WritableRaster::new(sm, db, origin)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn sample(&self, x: i32, y: i32, band: usize) -> Result<i32> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.sample(mx, my, band, &self.buffer())
    }

    pub fn sample_float(&self, x: i32, y: i32, band: usize) -> Result<f32> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.sample_float(mx, my, band, &self.buffer())
    }

    pub fn sample_double(&self, x: i32, y: i32, band: usize) -> Result<f64> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.sample_double(mx, my, band, &self.buffer())
    }

    pub fn samples(&self, x: i32, y: i32, w: i32, h: i32, band: usize) -> Result<Vec<i32>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.samples(mx, my, w, h, band, &self.buffer())
    }

    pub fn pixel(&self, x: i32, y: i32) -> Result<Vec<i32>> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.pixel(mx, my, &self.buffer())
    }

    pub fn pixel_double(&self, x: i32, y: i32) -> Result<Vec<f64>> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.pixel_double(mx, my, &self.buffer())
    }

    pub fn pixels(&self, x: i32, y: i32, w: i32, h: i32) -> Result<Vec<i32>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.pixels(mx, my, w, h, &self.buffer())
    }

    pub fn pixels_double(&self, x: i32, y: i32, w: i32, h: i32) -> Result<Vec<f64>> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.sample_model.pixels_double(mx, my, w, h, &self.buffer())
    }

    pub fn data_elements(&self, x: i32, y: i32) -> Result<TransferData> {
        let (mx, my) = self.to_model(x, y)?;
        self.sample_model.data_elements(mx, my, &self.buffer())
    }
}

// ============================================================================
// WritableRaster
// ============================================================================

/// A [`Raster`] that can also be written.
#[derive(Debug, Clone)]
pub struct WritableRaster {
    raster: Raster,
}

impl Deref for WritableRaster {
    type Target = Raster;

    fn deref(&self) -> &Raster {
        &self.raster
    }
}

impl WritableRaster {
    pub fn new(
        sample_model: SampleModel,
        data_buffer: DataBuffer,
        origin: (i32, i32),
    ) -> Result<Self> {
        Ok(Self {
            raster: Raster::new(sample_model, data_buffer, origin)?,
        })
    }

    /// Drop write access.
    pub fn into_raster(self) -> Raster {
        self.raster
    }

    /// Writable counterpart of [`Raster::create_child`].
    #[allow(clippy::too_many_arguments)]
    pub fn create_writable_child(
        &self,
        parent_x: i32,
        parent_y: i32,
        width: i32,
        height: i32,
        child_min_x: i32,
        child_min_y: i32,
        bands: Option<&[usize]>,
    ) -> Result<WritableRaster> {
        Ok(Self {
            raster: self.raster.create_child(
                parent_x,
                parent_y,
                width,
                height,
                child_min_x,
                child_min_y,
                bands,
            )?,
        })
    }

    pub fn create_writable_translated_child(
        &self,
        child_min_x: i32,
        child_min_y: i32,
    ) -> Result<WritableRaster> {
        Ok(Self {
            raster: self
                .raster
                .create_translated_child(child_min_x, child_min_y)?,
        })
    }

    fn with_buffer<R>(
        &self,
        f: impl FnOnce(&SampleModel, &mut DataBuffer) -> Result<R>,
    ) -> Result<R> {
        let mut db = self.raster.data_buffer.borrow_mut();
        f(&self.raster.sample_model, &mut db)
    }

    pub fn set_sample(&self, x: i32, y: i32, band: usize, value: i32) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.with_buffer(|sm, db| sm.set_sample(mx, my, band, value, db))
    }

    pub fn set_sample_float(&self, x: i32, y: i32, band: usize, value: f32) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.with_buffer(|sm, db| sm.set_sample_float(mx, my, band, value, db))
    }

    pub fn set_sample_double(&self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.with_buffer(|sm, db| sm.set_sample_double(mx, my, band, value, db))
    }

    pub fn set_samples(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        band: usize,
        values: &[i32],
    ) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.with_buffer(|sm, db| sm.set_samples(mx, my, w, h, band, values, db))
    }

    pub fn set_pixel(&self, x: i32, y: i32, values: &[i32]) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.with_buffer(|sm, db| sm.set_pixel(mx, my, values, db))
    }

    pub fn set_pixel_double(&self, x: i32, y: i32, values: &[f64]) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.with_buffer(|sm, db| sm.set_pixel_double(mx, my, values, db))
    }

    pub fn set_pixels(&self, x: i32, y: i32, w: i32, h: i32, values: &[i32]) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.with_buffer(|sm, db| sm.set_pixels(mx, my, w, h, values, db))
    }

    pub fn set_pixels_double(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        values: &[f64],
    ) -> Result<()> {
        let (mx, my) = self.region_to_model(x, y, w, h)?;
        self.with_buffer(|sm, db| sm.set_pixels_double(mx, my, w, h, values, db))
    }

    pub fn set_data_elements(&self, x: i32, y: i32, data: &TransferData) -> Result<()> {
        let (mx, my) = self.to_model(x, y)?;
        self.with_buffer(|sm, db| sm.set_data_elements(mx, my, data, db))
    }

    /// Copy `src` into this raster at the same coordinates.
    pub fn set_rect(&self, src: &Raster) -> Result<()> {
        self.set_rect_at(0, 0, src)
    }

    /// Copy `src`, shifted by `(dx, dy)`, into this raster. Only the overlap
    /// of the shifted source and this raster is written. Band counts must
    /// match.
    pub fn set_rect_at(&self, dx: i32, dy: i32, src: &Raster) -> Result<()> {
        if src.num_bands() != self.num_bands() {
            return Err(Error::illegal(format!(
                "source has {} bands, destination {}",
                src.num_bands(),
                self.num_bands()
            )));
        }
        let mut shifted = src.bounds();
        shifted.translate(dx, dy);
        let r = shifted.intersection(&self.bounds());
        if r.is_empty() {
            return Ok(());
        }
        // Read each row fully before writing so aliased storage is safe.
        for y in r.y..r.y + r.height {
            let row = src.pixels_double(r.x - dx, y - dy, r.width, 1)?;
            self.set_pixels_double(r.x, y, r.width, 1, &row)?;
        }
        Ok(())
    }
}

// ============================================================================
// Factories
// ============================================================================

fn origin_or_zero(location: Option<(i32, i32)>) -> (i32, i32) {
    location.unwrap_or((0, 0))
}

fn check_factory_dims(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(Error::illegal(format!(
            "raster width ({width}) and height ({height}) must be > 0"
        )));
    }
    Ok(())
}

/// Pixel-interleaved raster with `bands` samples per pixel in band order.
pub fn create_interleaved_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    bands: usize,
    location: Option<(i32, i32)>,
) -> Result<WritableRaster> {
    check_factory_dims(width, height)?;
    let scanline = (width as usize)
        .checked_mul(bands)
        .ok_or_else(|| Error::illegal("scanline stride overflows"))?;
    let sm = ComponentSampleModel::pixel_interleaved(
        data_type,
        width,
        height,
        bands,
        scanline,
        (0..bands).collect(),
    )?;
    log::debug!("interleaved raster {width}x{height}, {bands} {data_type:?} bands");
    build(sm.into(), location)
}

/// Banded raster: one bank per band.
pub fn create_banded_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    bands: usize,
    location: Option<(i32, i32)>,
) -> Result<WritableRaster> {
    check_factory_dims(width, height)?;
    let sm = ComponentSampleModel::banded(data_type, width, height, bands)?;
    log::debug!("banded raster {width}x{height}, {bands} {data_type:?} bands");
    build(sm.into(), location)
}

/// Raster whose pixels are single elements split by `masks`.
pub fn create_packed_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    masks: &[u32],
    location: Option<(i32, i32)>,
) -> Result<WritableRaster> {
    check_factory_dims(width, height)?;
    let sm = SinglePixelPackedSampleModel::new(data_type, width, height, masks)?;
    log::debug!("packed raster {width}x{height}, masks {masks:x?}");
    build(sm.into(), location)
}

/// Single-band raster packing several `bits`-wide pixels per element.
pub fn create_multi_packed_raster(
    data_type: DataType,
    width: i32,
    height: i32,
    bits: u32,
    location: Option<(i32, i32)>,
) -> Result<WritableRaster> {
    check_factory_dims(width, height)?;
    let sm = MultiPixelPackedSampleModel::new(data_type, width, height, bits)?;
    log::debug!("multi-packed raster {width}x{height}, {bits} bits per pixel");
    build(sm.into(), location)
}

fn build(sm: SampleModel, location: Option<(i32, i32)>) -> Result<WritableRaster> {
    let db = sm.create_data_buffer()?;
    WritableRaster::new(sm, db, origin_or_zero(location))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_validate_dims() {
        assert!(create_interleaved_raster(DataType::Byte, 0, 1, 3, None).is_err());
        assert!(create_banded_raster(DataType::Byte, 1, -1, 3, None).is_err());
        assert!(create_packed_raster(DataType::Int, 0, 0, &[0xff], None).is_err());
        assert!(create_multi_packed_raster(DataType::Byte, 1, 0, 1, None).is_err());
        assert!(create_interleaved_raster(DataType::Byte, 2, 2, 0, None).is_err());
    }

    #[test_log::test]
    fn test_location_translates_coordinates() {
        let r = create_interleaved_raster(DataType::Byte, 4, 4, 3, Some((10, 20))).unwrap();
        assert_eq!(r.bounds(), Rectangle::new(10, 20, 4, 4));
        r.set_pixel(13, 23, &[1, 2, 3]).unwrap();
        assert_eq!(r.pixel(13, 23).unwrap(), vec![1, 2, 3]);
        assert!(matches!(r.pixel(0, 0), Err(Error::IndexOutOfBounds(_))));
        assert!(r.set_sample(14, 20, 0, 1).is_err());
    }

    #[test]
    fn test_child_aliases_parent() {
        let parent = create_interleaved_raster(DataType::Byte, 8, 8, 3, None).unwrap();
        let child = parent
            .create_writable_child(2, 2, 4, 4, 0, 0, None)
            .unwrap();
        assert!(child.shares_buffer_with(&parent));
        assert_eq!(child.sample_model_translate_x(), -2);

        child.set_pixel(0, 0, &[9, 8, 7]).unwrap();
        assert_eq!(parent.pixel(2, 2).unwrap(), vec![9, 8, 7]);
        parent.set_sample(5, 5, 1, 42).unwrap();
        assert_eq!(child.sample(3, 3, 1).unwrap(), 42);
        assert!(child.pixel(4, 0).is_err());
    }

    #[test]
    fn test_child_outside_parent_fails() {
        let parent = create_banded_raster(DataType::UShort, 4, 4, 2, None).unwrap();
        let r = parent.create_child(2, 2, 4, 4, 0, 0, None);
        assert!(matches!(r, Err(Error::RasterFormat(_))));
        let r = parent.create_child(0, 0, 0, 4, 0, 0, None);
        assert!(matches!(r, Err(Error::RasterFormat(_))));
    }

    #[test]
    fn test_empty_region_far_from_origin() {
        let r = create_interleaved_raster(DataType::Byte, 2, 2, 1, Some((100, 100))).unwrap();
        assert!(r.pixels(100, 100, 0, 0).unwrap().is_empty());
        assert!(matches!(
            r.pixels(i32::MIN, 0, 0, 1),
            Err(Error::IndexOutOfBounds(_))
        ));
        assert!(r.set_pixels(i32::MIN, i32::MIN, 0, 0, &[]).is_err());
    }

    #[test]
    fn test_translated_child_and_band_subset() {
        let parent = create_interleaved_raster(DataType::Byte, 2, 2, 3, Some((5, 5))).unwrap();
        parent.set_pixel(6, 6, &[10, 20, 30]).unwrap();

        let moved = parent.create_translated_child(0, 0).unwrap();
        assert_eq!(moved.pixel(1, 1).unwrap(), vec![10, 20, 30]);
        assert_eq!(moved.bounds(), Rectangle::new(0, 0, 2, 2));

        let blue = parent
            .create_child(5, 5, 2, 2, 5, 5, Some(&[2]))
            .unwrap();
        assert_eq!(blue.num_bands(), 1);
        assert_eq!(blue.pixel(6, 6).unwrap(), vec![30]);
    }

    #[test]
    fn test_nested_children_compose_translation() {
        let root = create_interleaved_raster(DataType::Int, 10, 10, 1, None).unwrap();
        let a = root.create_writable_child(2, 2, 6, 6, 100, 100, None).unwrap();
        let b = a.create_writable_child(101, 101, 2, 2, 0, 0, None).unwrap();
        b.set_sample(1, 1, 0, 7).unwrap();
        assert_eq!(root.sample(4, 4, 0).unwrap(), 7);
        assert_eq!(a.sample(102, 102, 0).unwrap(), 7);
    }

    #[test]
    fn test_read_only_view_shares_storage() {
        let w = create_packed_raster(DataType::Int, 2, 2, &[0xff0000, 0xff00, 0xff], None)
            .unwrap();
        let view = w.create_translated_child(0, 0).unwrap();
        w.set_data_elements(1, 1, &TransferData::Int(vec![0x00aa_bbcc]))
            .unwrap();
        assert_eq!(view.pixel(1, 1).unwrap(), vec![0xaa, 0xbb, 0xcc]);
        let r = w.clone().into_raster();
        assert_eq!(r.data_elements(1, 1).unwrap(), TransferData::Int(vec![0x00aa_bbcc]));
    }

    #[test]
    fn test_set_rect_clips_to_overlap() {
        let dst = create_interleaved_raster(DataType::Byte, 4, 4, 1, None).unwrap();
        let src = create_interleaved_raster(DataType::Byte, 3, 3, 1, Some((2, 2))).unwrap();
        src.set_pixels(2, 2, 3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        dst.set_rect(&src).unwrap();
        assert_eq!(dst.samples(2, 2, 2, 2, 0).unwrap(), vec![1, 2, 4, 5]);
        assert_eq!(dst.sample(1, 1, 0).unwrap(), 0);

        dst.set_rect_at(-2, -2, &src).unwrap();
        assert_eq!(dst.samples(0, 0, 3, 1, 0).unwrap(), vec![1, 2, 3]);

        let rgb = create_interleaved_raster(DataType::Byte, 1, 1, 3, None).unwrap();
        assert!(dst.set_rect(&rgb).is_err());
    }

    #[test]
    fn test_raster_new_checks_buffer() {
        let sm: SampleModel = ComponentSampleModel::banded(DataType::Byte, 4, 4, 3)
            .unwrap()
            .into();
        let small = DataBuffer::new(DataType::Byte, 16, 1).unwrap();
        assert!(matches!(
            Raster::new(sm.clone(), small, (0, 0)),
            Err(Error::RasterFormat(_))
        ));
        let ok = sm.create_data_buffer().unwrap();
        assert!(Raster::new(sm, ok, (0, 0)).is_ok());
    }

    #[test]
    fn test_multi_packed_raster() {
        let r = create_multi_packed_raster(DataType::Byte, 9, 1, 1, None).unwrap();
        r.set_sample(8, 0, 0, 1).unwrap();
        let db = r.data_buffer();
        assert_eq!(db.borrow().elem(0, 1).unwrap(), 0x80);
        let c = r.create_compatible_writable_raster((3, 3)).unwrap();
        assert_eq!(c.bounds(), Rectangle::new(3, 3, 9, 1));
        assert!(!c.shares_buffer_with(&r));
    }
}
