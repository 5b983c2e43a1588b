//! Builds a parse tree out of the tokenizer's output, matching end tags to their openers.
use std::{borrow::Cow, fmt};

use crate::{
    error::ParseError,
    parser::{ParserConfig, Token, TokenKind, Tokenizer},
    registry::{Attributes, TagRegistry},
};

/// Tag name that closes itself as soon as the next tag (start or end) appears, e.g. list items.
pub const SELF_CLOSING_TAG: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Root {
        source: &'a str,
        children: Vec<Node<'a>>,
    },
    Text {
        content: Cow<'a, str>,
    },
    Tag {
        name: Cow<'a, str>,
        attributes: Attributes,
        children: Vec<Node<'a>>,
        /// Whether a matching end tag (or an implicit close) was found.
        closed: bool,
    },
}

impl<'a> Node<'a> {
    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Root { children, .. } | Node::Tag { children, .. } => children.as_slice(),
            Node::Text { .. } => &[],
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Node::Tag { closed: true, .. })
    }

    /// A tree is valid when no `Root` appears below the top and every subtree is valid.
    pub fn is_valid(&self) -> bool {
        self.children()
            .iter()
            .all(|child| !matches!(child, Node::Root { .. }) && child.is_valid())
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Root { source, .. } => write!(f, "Root - {source}"),
            Node::Text { content } => write!(f, "Text - {content}"),
            Node::Tag { name, .. } => write!(f, "Tag - {name}"),
        }
    }
}

/// Tokens left to consume, shared by every level of the recursive build.
/// Stored back to front so the next token is a cheap pop.
struct TokenCursor<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenCursor<'a> {
    fn new(mut tokens: Vec<Token<'a>>) -> Self {
        tokens.reverse();
        Self { tokens }
    }

    fn next(&mut self) -> Option<Token<'a>> {
        self.tokens.pop()
    }

    fn push_back(&mut self, token: Token<'a>) {
        self.tokens.push(token);
    }
}

pub struct TreeBuilder<'r> {
    registry: &'r TagRegistry,
    config: ParserConfig,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self {
            registry,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Tokenize `input` and build its tree. The returned node is always a [Node::Root].
    /// # Remarks
    /// Tags left open at the end of input produce `closed: false` nodes. End tags that match no open tag at
    /// their level are dropped.
    pub fn build<'a>(&self, input: &'a str) -> Result<Node<'a>, ParseError> {
        let tokens = Tokenizer::new(self.registry).tokenize(input);
        let mut cursor = TokenCursor::new(tokens);
        let mut children = Vec::new();
        self.build_level(&mut cursor, &mut children, None, 0)?;

        Ok(Node::Root {
            source: input,
            children,
        })
    }

    /// Consume tokens into `children` until `current_tag` is closed or tokens run out.
    /// Returns whether the tag was closed.
    fn build_level<'a>(
        &self,
        cursor: &mut TokenCursor<'a>,
        children: &mut Vec<Node<'a>>,
        current_tag: Option<&str>,
        depth: usize,
    ) -> Result<bool, ParseError> {
        while let Some(token) = cursor.next() {
            if current_tag == Some(SELF_CLOSING_TAG) && !token.is_text() {
                // Leave the token for the enclosing level.
                cursor.push_back(token);
                return Ok(true);
            }

            match token.kind {
                TokenKind::Text => children.push(Node::Text {
                    content: token.content,
                }),
                TokenKind::StartTag => {
                    if depth >= self.config.max_depth {
                        return Err(ParseError::NestingTooDeep {
                            limit: self.config.max_depth,
                        });
                    }

                    let mut inner = Vec::new();
                    let closed = self.build_level(cursor, &mut inner, Some(&*token.content), depth + 1)?;
                    children.push(Node::Tag {
                        name: token.content,
                        attributes: token.attributes,
                        children: inner,
                        closed,
                    });
                }
                TokenKind::EndTag => {
                    if current_tag == Some(&*token.content) {
                        return Ok(true);
                    }
                    tracing::trace!(tag = %token.content, start = token.start, "Dropping unmatched end tag");
                }
            }
        }

        Ok(false)
    }
}

/// Build the parse tree for `input` with the default [ParserConfig].
pub fn build_tree<'a>(input: &'a str, registry: &TagRegistry) -> Result<Node<'a>, ParseError> {
    TreeBuilder::new(registry).build(input)
}

#[cfg(test)]
mod tests;
