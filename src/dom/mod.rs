//! The markup front end and document model.
//!
//! The node graph is stored as two parallel index-addressed arrays (one for
//! elements, one for text nodes) with tagged [`NodeRef`] references; there
//! are no back-pointers and no shared ownership. A [`Context`] owns the
//! arrays, the style array, and the append-only computed-string store that
//! backs normalized text.

pub mod context;
pub mod lexer;
pub mod node;
pub mod parser;

pub use context::Context;
pub use node::{ElementNode, NodeKind, NodeRef, TextNode, TextSlice};
pub use parser::{parse, ParseError};
