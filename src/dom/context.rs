//! The document context: node arrays, interned strings, and the style
//! resolution pipeline.
//!
//! `resolve_styles` runs three passes over the tree:
//!
//! 1. **Inheritance pre-pass** — attributes whose literal value is
//!    `"inherit"` take the parent's current value, and the fixed
//!    inheritable set (`color`, `background-color`, `white-space`) is
//!    copied down to children that do not set it.
//! 2. **Style tree build** — depth-first attribute parsing into the flat
//!    style array, under a sentinel root style of 100% × 100%.
//! 3. **Whitespace collapsing** — per-node normalization plus run-boundary
//!    trimming, then a fix-up that copies the text-carrying properties
//!    from each element onto its text children.
//!
//! Normalized text that needs rewriting is interned into an append-only
//! store of owned strings; existing entries never move, so
//! [`TextSlice`]s stay valid for the Context's lifetime.

use std::collections::HashMap;

use crate::css::style::{Display, ItemType, Style, Whitespace, INHERITED_PROPERTIES};
use crate::dom::node::{ElementNode, NodeKind, NodeRef, TextNode, TextSlice};

/// Whitespace characters collapsed by the normalizer.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

const SPACE_PATTERN: &[char] = &[' ', '\n', '\t', '\r', '\x0c', '\x0b'];
const SPACE_PATTERN_KEEP_NEWLINE: &[char] = &[' ', '\t', '\r', '\x0c', '\x0b'];

/// A parsed document plus everything the layout passes need: the parallel
/// node arrays, the flat style array, and stable text storage.
#[derive(Debug, Default)]
pub struct Context {
    /// The (comment-stripped) source text; raw text slices point into it.
    pub source: String,
    pub elements: Vec<ElementNode>,
    pub texts: Vec<TextNode>,
    pub styles: Vec<Style>,
    pub id_cache: HashMap<String, usize>,
    /// Append-only store backing computed text; entries never move.
    computed: Vec<Box<str>>,
}

impl Context {
    /// The synthetic document root.
    pub const ROOT: NodeRef = NodeRef { index: 0, kind: NodeKind::Element };

    pub fn new(source: String) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Resolve a [`TextSlice`] to its characters.
    pub fn text(&self, slice: TextSlice) -> &str {
        slice.resolve(&self.source, &self.computed)
    }

    /// Intern a computed string and return a slice covering it.
    pub fn intern(&mut self, s: String) -> TextSlice {
        let len = s.len();
        self.computed.push(s.into_boxed_str());
        TextSlice::computed(self.computed.len() - 1, len)
    }

    /// Look up an element index by its `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<usize> {
        self.id_cache.get(id).copied()
    }

    /// Run the full style pipeline. Idempotent: styles and computed text
    /// are rebuilt from the raw attributes and raw text each time.
    pub fn resolve_styles(&mut self) {
        self.computed.clear();
        for text in &mut self.texts {
            text.normalized = TextSlice::empty();
        }

        self.resolve_inheritance(0);

        self.styles.clear();
        let mut root_style = Style::default();
        root_style.width = crate::css::number::Number::Percent(100.0);
        root_style.height = crate::css::number::Number::Percent(100.0);
        self.styles.push(root_style);
        self.elements[0].style_index = 0;
        self.build_style_tree(0);

        self.collapse_whitespace(0, Display::Block, true, false);
        self.fix_text_styles(0);
    }

    // -----------------------------------------------------------------------
    // Inheritance pre-pass
    // -----------------------------------------------------------------------

    fn resolve_inheritance(&mut self, el_index: usize) {
        // A surviving "inherit" means the parent had no value to give.
        self.elements[el_index].attributes.retain(|_, v| v != "inherit");

        let children = self.elements[el_index].children.clone();
        let parent_attrs = self.elements[el_index].attributes.clone();
        for child_ref in children {
            if child_ref.kind != NodeKind::Element {
                continue;
            }
            let child = &mut self.elements[child_ref.index];

            let inherit_keys: Vec<String> = child
                .attributes
                .iter()
                .filter(|(_, v)| v.as_str() == "inherit")
                .map(|(k, _)| k.clone())
                .collect();
            for key in inherit_keys {
                if let Some(value) = parent_attrs.get(&key) {
                    child.attributes.insert(key, value.clone());
                }
            }

            for key in INHERITED_PROPERTIES {
                if child.attributes.contains_key(key) {
                    continue;
                }
                if let Some(value) = parent_attrs.get(key) {
                    child.attributes.insert(key.to_owned(), value.clone());
                }
            }

            self.resolve_inheritance(child_ref.index);
        }
    }

    // -----------------------------------------------------------------------
    // Style tree build
    // -----------------------------------------------------------------------

    fn build_style_tree(&mut self, el_index: usize) {
        let parent_style_index = self.elements[el_index].style_index;
        let children = self.elements[el_index].children.clone();
        for child_ref in children {
            match child_ref.kind {
                NodeKind::Text => {
                    self.texts[child_ref.index].style_index = self.styles.len();
                    self.styles.push(Style::default());
                }
                NodeKind::Element => {
                    let parent_style = self.styles[parent_style_index].clone();
                    let child = &mut self.elements[child_ref.index];
                    child.style_index = self.styles.len();
                    let style = Style::parse(&child.tag, &child.attributes, Some(&parent_style));
                    self.styles.push(style);
                    self.build_style_tree(child_ref.index);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Whitespace collapsing
    // -----------------------------------------------------------------------

    /// Normalize one text run according to the effective whitespace mode.
    ///
    /// Returns either a (possibly end-trimmed) view of the raw slice, or a
    /// freshly interned collapsed string.
    fn normalize_text(&mut self, raw: TextSlice, ws: Whitespace) -> TextSlice {
        if raw.is_empty() {
            return TextSlice::empty();
        }
        if matches!(ws, Whitespace::Pre | Whitespace::PreWrap) {
            return raw;
        }

        enum Out {
            View(usize),
            Space,
            Collapsed(String),
        }

        let out = {
            let text = self.text(raw);
            let start = text.find(|c: char| c != ' ').unwrap_or(0);
            let end = match ws {
                Whitespace::PreLine => text.trim_end_matches(SPACE_PATTERN_KEEP_NEWLINE).len(),
                Whitespace::Normal => text.len(),
                _ => text.trim_end_matches(SPACE_PATTERN).len(),
            };

            let mut needs_collapse = false;
            let segment = &text[start.min(end)..end];
            let mut previous_was_space = false;
            for c in segment.chars() {
                if (c == '\n' && ws != Whitespace::PreLine) || c == '\t' || c == '\r' {
                    needs_collapse = true;
                    break;
                }
                if c == ' ' && previous_was_space {
                    needs_collapse = true;
                    break;
                }
                previous_was_space = c == ' ';
            }

            if !needs_collapse {
                Out::View(end)
            } else if text.trim_matches(is_space).is_empty() {
                Out::Space
            } else {
                let mut collapsed = String::with_capacity(segment.len() + 1);
                if start > 0 {
                    collapsed.push(' ');
                }
                let mut chars = segment.chars().peekable();
                while let Some(c) = chars.next() {
                    if c == '\n' && ws == Whitespace::PreLine {
                        collapsed.push('\n');
                        continue;
                    }
                    if c == '\r' {
                        continue;
                    }
                    if is_space(c) {
                        collapsed.push(' ');
                        while let Some(&next) = chars.peek() {
                            if !is_space(next) || (next == '\n' && ws == Whitespace::PreLine) {
                                break;
                            }
                            chars.next();
                        }
                        continue;
                    }
                    collapsed.push(c);
                }
                Out::Collapsed(collapsed)
            }
        };

        match out {
            Out::View(end) => raw.subslice(0..end),
            Out::Space => self.intern(" ".to_owned()),
            Out::Collapsed(s) => self.intern(s),
        }
    }

    fn ltrim_slice(&self, slice: TextSlice, pattern: &[char]) -> TextSlice {
        let text = self.text(slice);
        let trimmed = text.trim_start_matches(|c| pattern.contains(&c));
        slice.subslice(text.len() - trimmed.len()..text.len())
    }

    fn trim_slice(&self, slice: TextSlice, pattern: &[char]) -> TextSlice {
        let text = self.text(slice);
        let start = text.len() - text.trim_start_matches(|c| pattern.contains(&c)).len();
        let end = text.trim_end_matches(|c| pattern.contains(&c)).len();
        slice.subslice(start.min(end)..end)
    }

    /// Walk the tree collapsing whitespace at run boundaries.
    ///
    /// `last_was_whitespace` carries across siblings and element
    /// boundaries; an element with left/right padding counts as a
    /// whitespace producer at that boundary. Returns the flag's state
    /// after this subtree.
    fn collapse_whitespace(
        &mut self,
        el_index: usize,
        context: Display,
        mut last_was_whitespace: bool,
        has_right_padding: bool,
    ) -> bool {
        let parent_ws = self.styles[self.elements[el_index].style_index].whitespace;
        let children = self.elements[el_index].children.clone();
        for child_ref in children {
            match child_ref.kind {
                NodeKind::Text => {
                    let text_index = child_ref.index;
                    let style_index = self.texts[text_index].style_index;
                    let raw = self.texts[text_index].raw;
                    let txt = self.normalize_text(raw, parent_ws);
                    self.styles[style_index].whitespace = parent_ws;

                    let pattern: &[char] = if parent_ws == Whitespace::PreLine {
                        SPACE_PATTERN_KEEP_NEWLINE
                    } else {
                        SPACE_PATTERN
                    };
                    let preserve = matches!(parent_ws, Whitespace::Pre | Whitespace::PreWrap);

                    if !Style::display_is_inline_context(context) {
                        let trimmed_empty = self.text(txt).trim_matches(is_space).is_empty();
                        let style = &mut self.styles[style_index];
                        style.item_type = match context {
                            Display::Flex => ItemType::Flex,
                            Display::Grid => ItemType::Grid,
                            _ => ItemType::None,
                        };
                        style.display = Display::Block;
                        if trimmed_empty {
                            self.texts[text_index].normalized = TextSlice::empty();
                            continue;
                        }
                    } else {
                        self.styles[style_index].display = Display::Inline;
                    }

                    if txt.is_empty() {
                        continue;
                    }

                    if preserve {
                        self.texts[text_index].normalized = txt;
                        last_was_whitespace =
                            self.text(txt).ends_with(is_space);
                        continue;
                    }

                    let has_trailing_space = self.text(txt).ends_with(' ');
                    let mut txt = txt;
                    if last_was_whitespace {
                        txt = self.ltrim_slice(txt, pattern);
                    }

                    if !Style::display_is_inline_context(context)
                        || has_right_padding
                        || context == Display::InlineBlock
                    {
                        self.texts[text_index].normalized = self.trim_slice(txt, pattern);
                        last_was_whitespace = has_right_padding;
                    } else {
                        self.texts[text_index].normalized = txt;
                        last_was_whitespace = has_trailing_space;
                    }
                }
                NodeKind::Element => {
                    let style = self.styles[self.elements[child_ref.index].style_index].clone();
                    last_was_whitespace |= style.has_start_whitespace();
                    last_was_whitespace = self.collapse_whitespace(
                        child_ref.index,
                        style.display,
                        last_was_whitespace,
                        style.has_end_whitespace(),
                    );
                }
            }
        }
        last_was_whitespace
    }

    // -----------------------------------------------------------------------
    // Text-node style fix-up
    // -----------------------------------------------------------------------

    /// Copy the text-carrying properties from each element onto its text
    /// children.
    fn fix_text_styles(&mut self, el_index: usize) {
        let style = self.styles[self.elements[el_index].style_index].clone();
        let children = self.elements[el_index].children.clone();
        for child_ref in children {
            match child_ref.kind {
                NodeKind::Text => {
                    let text_style = &mut self.styles[self.texts[child_ref.index].style_index];
                    text_style.fg_color = style.fg_color;
                    text_style.bg_color = style.bg_color;
                    text_style.z_index = style.z_index;
                    text_style.overflow_wrap = style.overflow_wrap;
                    text_style.whitespace = style.whitespace;
                    text_style.text_style = style.text_style;
                }
                NodeKind::Element => self.fix_text_styles(child_ref.index),
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
