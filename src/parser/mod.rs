//! Tokenizer: turns raw BBCode into a flat stream of text, start tag and end tag tokens.
use std::{borrow::Cow, fmt, sync::LazyLock};

use regex::{CaptureMatches, Captures, Regex};

use crate::registry::{Attributes, TagRegistry};

use self::rules::NoParseRule;

pub(crate) mod rules;

/// Default nesting limit for [ParserConfig].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits applied while building a parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// How many tags may be open at once before building fails with
    /// [ParseError::NestingTooDeep][crate::ParseError::NestingTooDeep].
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Matches `[/name]` (group 1) or `[name=value attr="value" ...]` (group 2 is the name).
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\[(/[A-Za-z0-9_*]*)\]|\[([A-Za-z0-9_*]*)(="?[A-Za-z0-9.\-_:;/*?&]*"?)?( [A-Za-z0-9.\-_:;/*]+="?[A-Za-z0-9.\-_:;/*?&]*"?)*\]"#,
    )
    .unwrap()
});

/// Matches one attribute inside a start tag. Group 1 is absent for the tag's own `=value`.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9.\-_:;/*]+)?="?([A-Za-z0-9.\-_:;/*?&]*)"?"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    StartTag,
    EndTag,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Text => "Text",
            TokenKind::StartTag => "StartTag",
            TokenKind::EndTag => "EndTag",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The literal text for [TokenKind::Text], otherwise the lowercased tag name.
    pub content: Cow<'a, str>,
    /// Only populated for [TokenKind::StartTag].
    pub attributes: Attributes,
    /// The input this token was produced from.
    pub span: &'a str,
    /// Byte offset of `span` within the input.
    pub start: usize,
}

impl<'a> Token<'a> {
    pub fn text(span: &'a str, start: usize) -> Self {
        Self {
            kind: TokenKind::Text,
            content: Cow::Borrowed(span),
            attributes: Attributes::new(),
            span,
            start,
        }
    }

    fn from_captures(caps: &Captures<'a>) -> Self {
        let whole = caps.get_match();

        if let Some(close) = caps.get(1) {
            return Self {
                kind: TokenKind::EndTag,
                content: Cow::Owned(close.as_str()["/".len()..].to_ascii_lowercase()),
                attributes: Attributes::new(),
                span: whole.as_str(),
                start: whole.start(),
            };
        }

        let raw_name = caps.get(2).map_or("", |m| m.as_str());
        let name = raw_name.to_ascii_lowercase();
        let args = &whole.as_str()[("[".len() + raw_name.len())..(whole.len() - "]".len())];

        let mut attributes = Attributes::new();
        for attr in ATTR_RE.captures_iter(args) {
            let value = attr.get(2).map_or("", |m| m.as_str());
            match attr.get(1) {
                Some(key) => attributes.insert(key.as_str().to_ascii_lowercase(), value.to_owned()),
                None => attributes.insert(name.clone(), value.to_ascii_lowercase()),
            };
        }

        Self {
            kind: TokenKind::StartTag,
            content: Cow::Owned(name),
            attributes,
            span: whole.as_str(),
            start: whole.start(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == TokenKind::Text
    }

    pub fn is_start(&self, tag: &str) -> bool {
        self.kind == TokenKind::StartTag && self.content == tag
    }

    pub fn is_end(&self, tag: &str) -> bool {
        self.kind == TokenKind::EndTag && self.content == tag
    }

    /// The tag this token opens or closes, if it is a tag at all.
    pub fn tag_name(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Text => None,
            TokenKind::StartTag | TokenKind::EndTag => Some(&*self.content),
        }
    }

    /// Byte offset just past this token.
    pub fn end(&self) -> usize {
        self.start + self.span.len()
    }

    /// Turn a tag token back into the literal text it stands for.
    /// Start tags keep their source verbatim; end tags are rebuilt from the lowercased name.
    pub fn demote(&mut self) {
        match self.kind {
            TokenKind::Text => {}
            TokenKind::StartTag => {
                self.content = Cow::Borrowed(self.span);
                self.attributes.clear();
            }
            TokenKind::EndTag => {
                self.content = Cow::Owned(format!("[/{}]", self.content));
            }
        }
        self.kind = TokenKind::Text;
    }
}

impl PartialEq for Token<'_> {
    /// Tokens compare by kind and content; attributes and position are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.content == other.content
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.content, self.kind)
    }
}

/// The raw lexing pass: every tag-shaped match becomes a tag token, everything between becomes text.
/// # Remarks
/// No registry is consulted here, so unknown tags come out as tags. Use [Tokenizer] for the corrected stream.
pub struct Lexer<'a> {
    input: &'a str,
    matches: CaptureMatches<'static, 'a>,
    loc: usize,
    pending: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            matches: TAG_RE.captures_iter(input),
            loc: 0,
            pending: None,
        }
    }

    /// Returns all input text left to lex.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.loc..]
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        let Some(caps) = self.matches.next() else {
            // Trailing text after the last tag.
            if self.loc >= self.input.len() {
                return None;
            }
            let token = Token::text(self.remaining(), self.loc);
            self.loc = self.input.len();
            return Some(token);
        };

        let tag = Token::from_captures(&caps);
        let gap = self.loc..tag.start;
        self.loc = tag.end();

        if gap.is_empty() {
            Some(tag)
        } else {
            self.pending = Some(tag);
            Some(Token::text(&self.input[gap.clone()], gap.start))
        }
    }
}

/// Produces the corrected token stream for a given tag registry.
pub struct Tokenizer<'r> {
    registry: &'r TagRegistry,
}

impl<'r> Tokenizer<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self { registry }
    }

    /// Lex `input` and apply the registry's rules to the result.
    /// # Remarks
    /// Tags the registry does not know become text. The body of a no-nesting tag is collapsed into a single
    /// text token between its start and end tags; if that end tag never comes, the body is dropped.
    pub fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        let mut out = Vec::new();
        let mut rule: Option<NoParseRule<'a>> = None;

        for mut token in Lexer::new(input) {
            if let Some(active) = rule.as_mut() {
                if !active.check_should_release(&token) {
                    token.demote();
                    active.absorb(&token);
                    continue;
                }
                if let Some(active) = rule.take() {
                    out.push(active.release(input, token.start));
                }
                out.push(token);
                continue;
            }

            let descriptor = token.tag_name().map(|name| self.registry.get(name));
            match descriptor {
                None => {}
                Some(None) => {
                    tracing::trace!(tag = %token.content, start = token.start, "Unknown tag treated as text");
                    token.demote();
                }
                Some(Some(descriptor)) => {
                    if descriptor.no_nesting() && token.kind == TokenKind::StartTag {
                        tracing::debug!(tag = %token.content, start = token.start, "Entering no-nesting tag");
                        rule = Some(NoParseRule::new(token.content.clone(), token.end()));
                    }
                }
            }

            out.push(token);
        }

        if let Some(active) = rule {
            tracing::debug!(
                tag = %active.tag_name(),
                "No-nesting tag left open at end of input, dropping its body"
            );
        }

        out
    }
}
