//! The style model: colors, lengths, borders, and the per-element `Style`
//! record with its attribute parser.

pub mod border;
pub mod color;
pub mod number;
pub mod style;
