//! Raster types and the sub-pixel patch sampler used by the tracker.

pub mod f32;
pub mod sampling;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::sampling::{intersection_percent, sample_subpixel, Window};
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;
