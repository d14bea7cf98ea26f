mod color;
mod transform;

pub use color::{golden_hue, hsv_to_rgb, Rgb};
pub use transform::Transform;
