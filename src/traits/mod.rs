pub mod render_surface;

pub use render_surface::*;
