//! HTML rendering of a BBCode parse tree, and the one-call conversion entry point.
use std::{borrow::Cow, sync::LazyLock};

use bitflags::bitflags;
use regex::Regex;

use crate::{
    error::ParseError,
    parser::ParserConfig,
    registry::{TagDescriptor, TagRegistry},
    tree::{Node, TreeBuilder},
};

/// Markup emitted in place of each newline.
pub const LINE_BREAK: &str = "<br>";

static NEWLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n|\n|\r").unwrap());

bitflags! {
    /// Options for a conversion.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct RenderFlags: u8 {
        /// Drop the markup of every tag, keeping only its content.
        const STRIP_TAGS = 1 << 0;
        /// Convert newlines in top-level text to [LINE_BREAK]. Inside a tag, the tag's own policy applies.
        const INSERT_LINE_BREAKS = 1 << 1;
        /// Escape `&`, `<` and `>` in literal text.
        const ESCAPE_HTML = 1 << 2;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::INSERT_LINE_BREAKS | Self::ESCAPE_HTML
    }
}

/// Escape `&`, `<` and `>` in a single pass, so generated entities are never escaped twice.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Converts BBCode to HTML using the registered tags.
/// # Remarks
/// Holds no per-conversion state, so one serializer can be shared between threads.
#[derive(Debug, Default)]
pub struct HtmlSerializer {
    registry: TagRegistry,
    config: ParserConfig,
    flags: RenderFlags,
}

impl HtmlSerializer {
    /// Construct a new serializer with no tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct a new serializer with the given tags.
    pub fn with_tags(tags: Vec<TagDescriptor>) -> Self {
        Self::with_registry(TagRegistry::with_tags(tags))
    }

    pub fn with_registry(registry: TagRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_flags(mut self, flags: RenderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    /// Register the provided tag to the serializer.
    pub fn register_tag(&mut self, tag: TagDescriptor) {
        self.registry.register_tag(tag);
    }

    /// Register the provided tags to the serializer.
    pub fn register_tags(&mut self, tags: impl IntoIterator<Item = TagDescriptor>) {
        self.registry.register_tags(tags);
    }

    /// Serialize the given BBCode 'document' out to HTML.
    /// # Remarks
    /// Markup problems never fail: unknown tags come out as text, unclosed tags lose their markup, stray end
    /// tags are dropped, and a structurally invalid tree returns `input` unchanged. Only the nesting limit in
    /// [ParserConfig] produces an error.
    pub fn try_serialize(&self, input: &str) -> Result<String, ParseError> {
        let tree = TreeBuilder::new(&self.registry)
            .with_config(self.config)
            .build(input)?;

        if !tree.is_valid() {
            tracing::warn!(len = input.len(), "Parse tree is invalid, returning input unchanged");
            return Ok(input.to_owned());
        }

        Ok(self.render(
            tree.children(),
            self.flags.contains(RenderFlags::INSERT_LINE_BREAKS),
        ))
    }

    /// Like [HtmlSerializer::try_serialize], but input that trips the nesting limit is returned unchanged.
    pub fn serialize(&self, input: &str) -> String {
        match self.try_serialize(input) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "Returning input unchanged");
                input.to_owned()
            }
        }
    }

    /// Render a sequence of sibling nodes.
    /// `insert_line_breaks` applies to these nodes only; each tag's content uses its descriptor's policy.
    pub fn render(&self, nodes: &[Node<'_>], insert_line_breaks: bool) -> String {
        let mut out = String::new();
        self.render_into(nodes, insert_line_breaks, &mut out);
        out
    }

    fn render_into(&self, nodes: &[Node<'_>], insert_line_breaks: bool, out: &mut String) {
        let escape = self.flags.contains(RenderFlags::ESCAPE_HTML);
        let strip = self.flags.contains(RenderFlags::STRIP_TAGS);
        // Set by a tag that suppresses line breaks, holds until the next tag that doesn't.
        let mut suppress_line_break = false;

        for node in nodes {
            match node {
                Node::Text { content } => {
                    let text = if escape {
                        escape_html(content)
                    } else {
                        Cow::Borrowed(&**content)
                    };

                    if insert_line_breaks && !suppress_line_break {
                        out.push_str(&NEWLINE_RE.replace_all(&text, LINE_BREAK));
                    } else {
                        out.push_str(&text);
                    }
                }
                Node::Tag {
                    name,
                    attributes,
                    children,
                    closed,
                } => {
                    let Some(descriptor) = self.registry.get(name) else {
                        tracing::debug!(tag = %name, "No descriptor registered, rendering content only");
                        self.render_into(children, insert_line_breaks, out);
                        continue;
                    };

                    let content = self.render(children, descriptor.insert_line_breaks());
                    if *closed && !strip {
                        out.push_str(&descriptor.render(&content, attributes));
                    } else {
                        out.push_str(&content);
                    }

                    suppress_line_break = descriptor.suppress_line_breaks();
                }
                Node::Root { children, .. } => self.render_into(children, insert_line_breaks, out),
            }
        }
    }
}

#[cfg(feature = "builtins")]
pub mod builtins;
