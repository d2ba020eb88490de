//! Recursive-descent markup parser.
//!
//! Produces the document [`Context`]: the element and text-node arrays, a
//! synthetic `#root` element at index 0, attribute maps (with backslash
//! escapes materialized), and the id → element cache. The parser is
//! permissive about stray punctuation but reports structural errors —
//! unclosed or mismatched tags — as [`ParseError`]s.

use std::ops::Range;

use crate::dom::context::Context;
use crate::dom::lexer::{strip_comments, tokenize, Token};
use crate::dom::node::{ElementNode, NodeKind, NodeRef, TextNode, TextSlice};

/// Structural markup errors.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedCloseTag { expected: String, found: String },
}

/// Parse a markup document into a [`Context`].
pub fn parse(source: &str) -> Result<Context, ParseError> {
    let source = strip_comments(source);
    let tokens = tokenize(&source);
    let mut parser = Parser {
        tokens,
        cursor: 0,
        ctx: Context::new(source),
    };
    parser.ctx.elements.push(ElementNode::root());
    parser.parse_children(0)?;

    // Anything left over can only be a stray closing tag.
    if let Some((_, span)) = parser.peek() {
        let position = span.start;
        return Err(ParseError::UnexpectedToken {
            position,
            message: "closing tag without a matching open tag".into(),
        });
    }
    Ok(parser.ctx)
}

struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    cursor: usize,
    ctx: Context,
}

impl Parser {
    fn peek(&self) -> Option<&(Token, Range<usize>)> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self, ahead: usize) -> Option<Token> {
        self.tokens.get(self.cursor + ahead).map(|(t, _)| *t)
    }

    fn bump(&mut self) -> Option<(Token, Range<usize>)> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn text_of(&self, span: &Range<usize>) -> &str {
        &self.ctx.source[span.clone()]
    }

    /// Parse the children of `parent` until EOF or a closing tag.
    fn parse_children(&mut self, parent: usize) -> Result<(), ParseError> {
        while let Some((token, _)) = self.peek() {
            match token {
                Token::Text => {
                    let (_, span) = self.bump().expect("peeked");
                    let index = self.ctx.texts.len();
                    self.ctx.texts.push(TextNode::new(TextSlice::source(span)));
                    self.ctx.elements[parent]
                        .children
                        .push(NodeRef { index, kind: NodeKind::Text });
                }
                Token::Lt => {
                    if self.peek_kind(1) == Some(Token::Slash) {
                        // The caller owns this closing tag.
                        return Ok(());
                    }
                    self.parse_element(parent)?;
                }
                // Stray punctuation between elements is skipped.
                _ => {
                    self.bump();
                }
            }
        }
        Ok(())
    }

    fn parse_element(&mut self, parent: usize) -> Result<(), ParseError> {
        self.bump(); // `<`
        let (token, span) = self.bump().ok_or(ParseError::UnexpectedEof("tag name"))?;
        if token != Token::Ident {
            return Err(ParseError::UnexpectedToken {
                position: span.start,
                message: format!("expected tag name, got {token:?}"),
            });
        }
        let tag = self.text_of(&span).to_owned();

        let el_index = self.ctx.elements.len();
        self.ctx.elements.push(ElementNode::new(tag.clone()));
        self.ctx.elements[parent]
            .children
            .push(NodeRef { index: el_index, kind: NodeKind::Element });

        loop {
            match self.peek().map(|(t, _)| *t) {
                Some(Token::Ident) => {
                    let (_, key_span) = self.bump().expect("peeked");
                    let key = self.text_of(&key_span).to_owned();
                    let mut value = String::new();
                    if self.peek_kind(0) == Some(Token::Eq) {
                        self.bump();
                        if self.peek_kind(0) == Some(Token::Str) {
                            let (_, value_span) = self.bump().expect("peeked");
                            value = unquote(self.text_of(&value_span));
                        }
                    }
                    if key == "id" {
                        self.ctx.id_cache.insert(value.clone(), el_index);
                    }
                    self.ctx.elements[el_index].attributes.insert(key, value);
                }
                Some(Token::Gt) => {
                    self.bump();
                    self.parse_children(el_index)?;
                    self.expect_close_tag(&tag)?;
                    return Ok(());
                }
                Some(Token::SelfCloseGt) => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(ParseError::UnexpectedEof("'>' or '/>'")),
            }
        }
    }

    /// Consume `</tag>`.
    fn expect_close_tag(&mut self, tag: &str) -> Result<(), ParseError> {
        self.bump().ok_or(ParseError::UnexpectedEof("closing tag"))?; // `<`
        self.bump().ok_or(ParseError::UnexpectedEof("closing tag"))?; // `/`
        let (token, span) = self.bump().ok_or(ParseError::UnexpectedEof("closing tag name"))?;
        if token != Token::Ident {
            return Err(ParseError::UnexpectedToken {
                position: span.start,
                message: format!("expected closing tag name, got {token:?}"),
            });
        }
        let found = self.text_of(&span);
        if found != tag {
            return Err(ParseError::MismatchedCloseTag {
                expected: tag.to_owned(),
                found: found.to_owned(),
            });
        }
        match self.bump() {
            Some((Token::Gt, _)) => Ok(()),
            Some((token, span)) => Err(ParseError::UnexpectedToken {
                position: span.start,
                message: format!("expected '>', got {token:?}"),
            }),
            None => Err(ParseError::UnexpectedEof("'>'")),
        }
    }
}

/// Strip the surrounding quotes from an attribute value and process
/// backslash escapes. Unknown escapes are dropped.
fn unquote(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    if !inner.contains('\\') {
        return inner.to_owned();
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            _ => {}
        }
    }
    out
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(ctx: &Context, node: NodeRef) -> &str {
        assert_eq!(node.kind, NodeKind::Text);
        ctx.text(ctx.texts[node.index].raw)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    #[test]
    fn single_element_with_text() {
        let ctx = parse("<text>hello</text>").unwrap();
        assert_eq!(ctx.elements.len(), 2); // #root + text
        assert_eq!(ctx.elements[1].tag, "text");
        assert_eq!(ctx.elements[0].children.len(), 1);
        assert_eq!(ctx.elements[1].children.len(), 1);
        assert_eq!(text_of(&ctx, ctx.elements[1].children[0]), "hello");
    }

    #[test]
    fn nested_elements_in_order() {
        let ctx = parse("<col><a>1</a><b>2</b></col>").unwrap();
        let col = &ctx.elements[1];
        assert_eq!(col.tag, "col");
        assert_eq!(col.children.len(), 2);
        assert_eq!(ctx.elements[col.children[0].index].tag, "a");
        assert_eq!(ctx.elements[col.children[1].index].tag, "b");
    }

    #[test]
    fn top_level_text_attaches_to_root() {
        let ctx = parse("before<b>x</b>after").unwrap();
        let root = &ctx.elements[0];
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].kind, NodeKind::Text);
        assert_eq!(root.children[1].kind, NodeKind::Element);
        assert_eq!(root.children[2].kind, NodeKind::Text);
        assert_eq!(text_of(&ctx, root.children[2]), "after");
    }

    #[test]
    fn self_closing_element() {
        let ctx = parse("<col><hr/><text>x</text></col>").unwrap();
        let col = &ctx.elements[1];
        assert_eq!(col.children.len(), 2);
        assert_eq!(ctx.elements[col.children[0].index].tag, "hr");
        assert!(ctx.elements[col.children[0].index].children.is_empty());
    }

    #[test]
    fn comments_are_stripped() {
        let ctx = parse("<col><!-- note --><text>x</text></col>").unwrap();
        let col = &ctx.elements[1];
        // The comment collapses to a whitespace text node plus the element.
        let element_children: Vec<_> = col
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::Element)
            .collect();
        assert_eq!(element_children.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    #[test]
    fn attributes_parsed() {
        let ctx = parse(r#"<row color="red" border="thin solid red"></row>"#).unwrap();
        let row = &ctx.elements[1];
        assert_eq!(row.attributes["color"], "red");
        assert_eq!(row.attributes["border"], "thin solid red");
    }

    #[test]
    fn valueless_attribute_is_empty() {
        let ctx = parse("<row hidden></row>").unwrap();
        assert_eq!(ctx.elements[1].attributes["hidden"], "");
    }

    #[test]
    fn attribute_escapes() {
        let ctx = parse(r#"<t a="x\ny"></t>"#).unwrap();
        assert_eq!(ctx.elements[1].attributes["a"], "x\ny");
    }

    #[test]
    fn unknown_escape_is_dropped() {
        let ctx = parse(r#"<t a="x\qy"></t>"#).unwrap();
        assert_eq!(ctx.elements[1].attributes["a"], "xy");
    }

    #[test]
    fn id_attribute_fills_cache() {
        let ctx = parse(r#"<col id="main"><text id="msg">x</text></col>"#).unwrap();
        assert_eq!(ctx.element_by_id("main"), Some(1));
        assert_eq!(ctx.element_by_id("msg"), Some(2));
        assert_eq!(ctx.element_by_id("nope"), None);
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn mismatched_close_tag() {
        let err = parse("<a>x</b>").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedCloseTag { .. }));
    }

    #[test]
    fn unclosed_tag() {
        let err = parse("<a><b>x</b>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof(_)));
    }

    #[test]
    fn stray_close_tag() {
        let err = parse("</a>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn error_displays() {
        let err = parse("<a>x</b>").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("</a>"), "{msg}");
        assert!(msg.contains("</b>"), "{msg}");
    }
}
