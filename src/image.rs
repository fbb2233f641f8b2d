//! An image: a color model paired with a raster it can interpret.

use crate::color_model::ColorModel;
use crate::error::{Error, Result};
use crate::raster::WritableRaster;

/// Pixels in `raster`, colors from `color_model`.
#[derive(Debug, Clone)]
pub struct RasterImage<C: ColorModel> {
    color_model: C,
    raster: WritableRaster,
}

impl<C: ColorModel> RasterImage<C> {
    /// Pair `color_model` with `raster`. The raster's sample model must be
    /// one the color model accepts.
    pub fn new(color_model: C, raster: WritableRaster) -> Result<Self> {
        if !color_model.is_compatible_raster(&raster) {
            return Err(Error::illegal(format!(
                "raster with {} bands of {:?} does not match the color model",
                raster.num_bands(),
                raster.transfer_type()
            )));
        }
        log::debug!(
            "image {}x{} at ({}, {})",
            raster.width(),
            raster.height(),
            raster.min_x(),
            raster.min_y()
        );
        Ok(Self {
            color_model,
            raster,
        })
    }

    /// Blank image with a raster laid out for `color_model`.
    pub fn with_size(color_model: C, width: i32, height: i32) -> Result<Self> {
        let raster = color_model.create_compatible_writable_raster(width, height)?;
        Self::new(color_model, raster)
    }

    pub fn width(&self) -> i32 {
        self.raster.width()
    }

    pub fn height(&self) -> i32 {
        self.raster.height()
    }

    pub fn color_model(&self) -> &C {
        &self.color_model
    }

    pub fn raster(&self) -> &WritableRaster {
        &self.raster
    }

    /// Non-premultiplied sRGB color of the pixel at `(x, y)` as
    /// `0xAARRGGBB`.
    pub fn rgb(&self, x: i32, y: i32) -> Result<u32> {
        let data = self.raster.data_elements(x, y)?;
        self.color_model.rgb_of(&data)
    }

    /// Store the color `argb`, converted by the color model, at `(x, y)`.
    pub fn set_rgb(&self, x: i32, y: i32, argb: u32) -> Result<()> {
        let data = self.color_model.data_elements(argb)?;
        self.raster.set_data_elements(x, y, &data)
    }

    /// Colors of a `w` x `h` region, row-major.
    pub fn rgb_region(&self, x: i32, y: i32, w: i32, h: i32) -> Result<Vec<u32>> {
        let mut out = Vec::with_capacity(w.max(0) as usize * h.max(0) as usize);
        for j in y..y.saturating_add(h) {
            for i in x..x.saturating_add(w) {
                out.push(self.rgb(i, j)?);
            }
        }
        Ok(out)
    }
}
