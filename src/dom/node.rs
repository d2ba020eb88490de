//! Node types: NodeRef, ElementNode, TextNode, and the TextSlice handle.

use std::collections::HashMap;
use std::ops::Range;

/// Which parallel array a [`NodeRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
}

/// A tagged reference into the [`Context`](super::Context)'s node arrays.
///
/// Indices are stable for the Context's lifetime; nodes never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub index: usize,
    pub kind: NodeKind,
}

// ---------------------------------------------------------------------------
// TextSlice
// ---------------------------------------------------------------------------

/// Which text store a [`TextSlice`] resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Store {
    /// The document source buffer.
    #[default]
    Source,
    /// An entry in the Context's computed-string store.
    Computed(u32),
}

/// A byte-range handle into one of the Context's text stores.
///
/// This is how "views into stable storage" are expressed without
/// self-referential borrows: the source buffer never changes and the
/// computed store only grows, so a slice stays valid for the Context's
/// lifetime. Resolve with [`Context::text`](super::Context::text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSlice {
    store: Store,
    start: u32,
    end: u32,
}

impl TextSlice {
    /// The empty slice.
    pub const fn empty() -> Self {
        Self { store: Store::Source, start: 0, end: 0 }
    }

    /// A slice of the source buffer.
    pub fn source(span: Range<usize>) -> Self {
        Self {
            store: Store::Source,
            start: span.start as u32,
            end: span.end as u32,
        }
    }

    /// A slice of computed-store entry `index`.
    pub(crate) fn computed(index: usize, len: usize) -> Self {
        Self {
            store: Store::Computed(index as u32),
            start: 0,
            end: len as u32,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Narrow to a byte range relative to this slice.
    pub fn subslice(&self, range: Range<usize>) -> TextSlice {
        debug_assert!(range.start <= range.end && range.end <= self.len());
        TextSlice {
            store: self.store,
            start: self.start + range.start as u32,
            end: self.start + range.end as u32,
        }
    }

    pub(crate) fn resolve<'a>(&self, source: &'a str, computed: &'a [Box<str>]) -> &'a str {
        let range = self.start as usize..self.end as usize;
        match self.store {
            Store::Source => &source[range],
            Store::Computed(i) => &computed[i as usize][range],
        }
    }
}

// ---------------------------------------------------------------------------
// ElementNode / TextNode
// ---------------------------------------------------------------------------

/// One element of the document tree.
#[derive(Debug, Clone, Default)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    /// Children in document order.
    pub children: Vec<NodeRef>,
    /// Index into the Context's style array; valid after the resolver
    /// phase.
    pub style_index: usize,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: HashMap::new(),
            children: Vec::new(),
            style_index: 0,
        }
    }

    /// The synthetic document root.
    pub fn root() -> Self {
        Self::new("#root")
    }
}

/// One run of raw character data.
#[derive(Debug, Clone, Default)]
pub struct TextNode {
    /// The raw source slice as lexed.
    pub raw: TextSlice,
    /// The whitespace-normalized slice; empty until the resolver runs, and
    /// left empty for runs that collapse away entirely.
    pub normalized: TextSlice,
    pub style_index: usize,
}

impl TextNode {
    pub fn new(raw: TextSlice) -> Self {
        Self {
            raw,
            normalized: TextSlice::empty(),
            style_index: 0,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
