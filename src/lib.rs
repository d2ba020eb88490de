//! # termflow
//!
//! termflow renders a small HTML/CSS-like markup language onto a terminal
//! cell grid. A parsed element tree with per-node style is turned into a
//! stream of positioned, styled glyphs inside a fixed-size grid, honoring a
//! CSS-inspired box model, inline/block flow, text wrapping, scroll
//! clipping, z-ordering, and incremental flushing.
//!
//! The pipeline, leaves first:
//!
//! 1. [`dom`] — markup front end and the [`dom::Context`]: style
//!    inheritance, attribute parsing, whitespace collapsing.
//! 2. [`layout`] — two-phase layout: cyclic width resolution, then cyclic
//!    height / line-box construction with vertical-margin collapsing.
//! 3. [`render`] — cell grid with z-buffer arbitration, viewport clip
//!    stack, border drawing, dirty-cell diffing, minimal ANSI emission.
//!
//! [`screen::Terminal`] ties a persistent grid and an ANSI driver together
//! for per-frame render/flush loops.

pub mod geometry;

pub mod css;
pub mod dom;
pub mod layout;
pub mod render;

pub mod screen;

pub mod testing;
