use std::borrow::Cow;

use super::{Token, TokenKind};

/// Disables tag parsing inside a no-nesting tag until its matching end tag shows up.
/// Every token swallowed in the meantime is folded into one text body.
pub(crate) struct NoParseRule<'a> {
    tag_name: Cow<'a, str>,
    body: String,
    body_start: usize,
}

impl<'a> NoParseRule<'a> {
    /// `body_start` is the byte offset just past the tag that opened the rule.
    pub fn new(tag_name: Cow<'a, str>, body_start: usize) -> Self {
        Self {
            tag_name,
            body: String::new(),
            body_start,
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Only the end tag of the rule's own tag releases it.
    pub fn check_should_release(&self, next: &Token<'_>) -> bool {
        next.kind == TokenKind::EndTag && next.content == self.tag_name
    }

    /// Append a token, already demoted to text, to the body.
    pub fn absorb(&mut self, token: &Token<'_>) {
        debug_assert!(token.is_text());
        self.body.push_str(&token.content);
    }

    /// Finish the rule, producing the text token that stands in for everything it swallowed.
    /// `body_end` is where the releasing end tag starts.
    pub fn release(self, input: &'a str, body_end: usize) -> Token<'a> {
        Token {
            kind: TokenKind::Text,
            content: Cow::Owned(self.body),
            attributes: Default::default(),
            span: &input[self.body_start..body_end],
            start: self.body_start,
        }
    }
}
