//! Rasterization: the cell grid and z-buffer, the viewport clip stack,
//! the ANSI driver, and the layout-tree renderer.

pub mod device;
pub mod driver;
pub mod grid;
pub mod renderer;

pub use device::{ClipGuard, Device, PutPixel};
pub use driver::Driver;
pub use grid::{Cell, CellGrid, NullGrid, PixelStyle, Screen};
pub use renderer::render;
