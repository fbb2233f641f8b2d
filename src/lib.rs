//! # raster-geom
//!
//! The numeric core of a 2D imaging toolkit: affine geometry and path
//! iteration on one side, pixel storage and color interpretation on the
//! other.
//!
//! - Points, lines, rectangles, ellipses and general paths in single and
//!   double precision
//! - 2D affine transforms with lazy type classification
//! - A forward-only path iteration protocol with curve flattening
//! - Data buffers, sample models and rasters with aliasing children
//! - Packed, direct, indexed and component color models
//!
//! ## Architecture
//!
//! Pixels are stored in a [`DataBuffer`]. A [`SampleModel`] maps
//! `(x, y, band)` onto buffer elements, and a [`Raster`] places a sample
//! model at a position in the plane. Child rasters share their parent's
//! buffer. A [`ColorModel`] turns the pixel values of a raster into ARGB
//! colors, and a [`RasterImage`] pairs the two.

// Foundation
pub mod basics;
pub mod error;
pub mod math;

// Geometry
pub mod affine_transform;
pub mod ellipse;
pub mod line;
pub mod point;
pub mod rectangle;
pub mod shape;

// Path iteration
pub mod flatten;
pub mod path;
pub mod path_iterator;

// Pixel storage
pub mod data_buffer;
pub mod raster;
pub mod sample_model;
pub mod sample_model_component;
pub mod sample_model_multi_packed;
pub mod sample_model_packed;

// Color
pub mod color_model;
pub mod color_model_component;
pub mod color_model_index;
pub mod color_model_packed;
pub mod color_space;
pub mod image;

pub use affine_transform::{AffineTransform, TransformType};
pub use basics::WindingRule;
pub use color_model::{ColorModel, Transparency};
pub use color_model_component::ComponentColorModel;
pub use color_model_index::IndexColorModel;
pub use color_model_packed::{DirectColorModel, PackedColorModel};
pub use color_space::ColorSpace;
pub use data_buffer::{DataBuffer, DataType, TransferData};
pub use ellipse::{Ellipse2D, Ellipse2DD, Ellipse2DF};
pub use error::{Error, Result};
pub use flatten::FlatteningPathIterator;
pub use image::RasterImage;
pub use line::{Line2D, Line2DD, Line2DF};
pub use path::Path2D;
pub use path_iterator::{PathIterator, Segment};
pub use point::{Point2D, Point2DD, Point2DF};
pub use raster::{Raster, WritableRaster};
pub use rectangle::{Rectangle, Rectangle2D, Rectangle2DD, Rectangle2DF};
pub use sample_model::SampleModel;
pub use shape::Shape;
