pub mod canvas;
pub mod geometry;
pub mod hit;
pub mod surface;
pub mod svg;

pub use canvas::{CanvasSurface, DrawOp};
pub use hit::{Hit, HitOptions, HitPart, hit_test};
pub use surface::{RenderSurface, rebuild, sync};
pub use svg::SvgSurface;
