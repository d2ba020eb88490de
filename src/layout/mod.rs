//! Two-phase layout: cyclic width resolution, then cyclic height and
//! line-box construction with vertical-margin collapsing.

pub mod engine;
pub mod line_box;
pub mod text;

pub use engine::{LayoutNode, LayoutTree};
pub use line_box::{LineBox, LineSpan};
pub use text::{find_word, measure_width, TextLayouter};
