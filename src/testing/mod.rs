//! Test helpers: render markup to plain strings for assertions.

pub mod snapshot;

pub use snapshot::{grid_to_string, render_source, render_source_to_string};
