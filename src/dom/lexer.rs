//! logos-based markup tokenizer.
//!
//! The lexer runs in two modes and morphs between them: outside a tag
//! everything up to the next `<` is one text-content token; inside a tag
//! (between `<` and `>`), whitespace is skipped and identifiers, `=`,
//! quoted strings, and the closing forms are tokenized.
//!
//! Token priority in logos is longest-match-first, which resolves the two
//! ambiguities here: `/>` beats `/`, and quoted strings beat identifiers.

use std::ops::Range;

use logos::Logos;

/// Content-mode tokens: raw character data and the tag opener.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ContentToken {
    #[token("<")]
    TagOpen,

    /// Everything up to the next `<`, whitespace included.
    #[regex(r"[^<]+")]
    Text,
}

/// Tag-mode tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0c]+")]
enum TagToken {
    #[token(">")]
    TagClose,

    #[token("/>")]
    SelfClose,

    #[token("/")]
    Slash,

    #[token("=")]
    Eq,

    /// Double-quoted string with backslash escapes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    /// Tag and attribute names: anything that is not markup punctuation.
    #[regex(r#"[^ \t\r\n\x0c=/<>"]+"#)]
    Ident,
}

/// A unified markup token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `/>`
    SelfCloseGt,
    /// `/` (only meaningful directly after `<`)
    Slash,
    /// `=`
    Eq,
    /// A tag or attribute name.
    Ident,
    /// A double-quoted attribute value, quotes included.
    Str,
    /// Raw character data between tags.
    Text,
}

/// Replace `<!-- ... -->` comments with a single space each.
///
/// An unterminated comment swallows the rest of the input.
pub fn strip_comments(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(open) = rest.find("<!--") {
        result.push_str(&rest[..open]);
        result.push(' ');
        match rest[open + 4..].find("-->") {
            Some(close) => rest = &rest[open + 4 + close + 3..],
            None => return result,
        }
    }
    result.push_str(rest);
    result
}

/// Tokenize a markup source into `(token, byte-span)` pairs.
///
/// Unlexable bytes are skipped; the stream never fails.
pub fn tokenize(source: &str) -> Vec<(Token, Range<usize>)> {
    let mut out = Vec::new();
    let mut content = ContentToken::lexer(source);
    loop {
        let Some(next) = content.next() else {
            return out;
        };
        match next {
            Err(()) => continue,
            Ok(ContentToken::Text) => {
                out.push((Token::Text, content.span()));
                continue;
            }
            Ok(ContentToken::TagOpen) => {}
        }

        out.push((Token::Lt, content.span()));
        let mut tag = content.morph::<TagToken>();
        loop {
            let Some(next) = tag.next() else {
                return out;
            };
            let token = match next {
                Err(()) => continue,
                Ok(TagToken::TagClose) => {
                    out.push((Token::Gt, tag.span()));
                    break;
                }
                Ok(TagToken::SelfClose) => {
                    out.push((Token::SelfCloseGt, tag.span()));
                    break;
                }
                Ok(TagToken::Slash) => Token::Slash,
                Ok(TagToken::Eq) => Token::Eq,
                Ok(TagToken::Str) => Token::Str,
                Ok(TagToken::Ident) => Token::Ident,
            };
            out.push((token, tag.span()));
        }
        content = tag.morph();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
