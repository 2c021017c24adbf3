//! Image pipeline - responsive renditions for post avatars

mod backend;
mod fluid;
mod pipeline;

pub use backend::{Dimensions, ImageBackend, ImageError, ResizeParams, RustBackend};
pub use fluid::{fluid_widths, FluidImage, Rendition};
pub use pipeline::{ImageIndex, ImagePipeline};
