//! Drawing
//!
//! Followers paint through the [`Canvas`] trait. The demo host backs it with
//! an egui painter over a wgpu surface; tests use the recording [`DrawList`].

pub mod canvas;
pub mod context;
pub mod painter;

pub use canvas::{Canvas, DrawCommand, DrawList, Rgba};
pub use context::{ContextError, GpuContext};
pub use painter::PainterCanvas;
