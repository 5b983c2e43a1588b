//! Built-in tag catalog and shorthand constructors for registering new tags.
use std::borrow::Cow;

use super::{escape_html, HtmlSerializer};
use crate::registry::{Attributes, TagDescriptor, TagFlags, TagMarkup};

impl TagDescriptor {
    /// A tag that inserts line breaks in its content and renders as `<name>content</name>`.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::simple_with_line_breaks(name, true)
    }

    /// [TagDescriptor::simple] with line-break insertion chosen by the caller.
    pub fn simple_with_line_breaks(name: impl Into<String>, insert_line_breaks: bool) -> Self {
        Self::with_flags(name, line_break_flags(insert_line_breaks))
    }

    /// Like [TagDescriptor::simple], but rendering as a different HTML element, e.g. `[*]` as `<li>`.
    pub fn simple_as(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::simple_as_with_line_breaks(name, true, target)
    }

    pub fn simple_as_with_line_breaks(
        name: impl Into<String>,
        insert_line_breaks: bool,
        target: impl Into<String>,
    ) -> Self {
        Self::custom_with_line_breaks(name, NamedElement(target.into()), insert_line_breaks)
    }

    /// A tag that inserts line breaks in its content and renders through `markup`.
    pub fn custom(name: impl Into<String>, markup: impl TagMarkup + 'static) -> Self {
        Self::custom_with_line_breaks(name, markup, true)
    }

    pub fn custom_with_line_breaks(
        name: impl Into<String>,
        markup: impl TagMarkup + 'static,
        insert_line_breaks: bool,
    ) -> Self {
        Self::new(name, line_break_flags(insert_line_breaks), markup)
    }
}

fn line_break_flags(insert_line_breaks: bool) -> TagFlags {
    if insert_line_breaks {
        TagFlags::INSERT_LINE_BREAKS
    } else {
        TagFlags::empty()
    }
}

/// Wraps content in a fixed element, regardless of the BBCode tag's name.
#[derive(Clone, Debug)]
pub struct NamedElement(pub String);

impl TagMarkup for NamedElement {
    fn render(&self, _: &str, content: &str, _: &Attributes) -> String {
        format!("<{0}>{content}</{0}>", self.0)
    }
}

/// Outputs its content with no markup at all. Registered as no-nesting, so `[text]` works as an escape hatch
/// for literal BBCode.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlainTextTag;

impl TagMarkup for PlainTextTag {
    fn render(&self, _: &str, content: &str, _: &Attributes) -> String {
        content.to_owned()
    }
}

/// An image embed, using the tag's content as the source.
/// # Exact output
/// ```html
/// <img src="content" />
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageTag;

impl TagMarkup for ImageTag {
    fn render(&self, _: &str, content: &str, _: &Attributes) -> String {
        format!("<img src=\"{content}\" />")
    }
}

/// A link opening in a new tab. The target is the `url` attribute (`[url=...]`) if given, else the content.
/// Targets without an `http://` or `https://` prefix get `http://` prepended.
/// # Exact output
/// ```html
/// <a href="target" target="_blank">content</a>
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct LinkTag;

impl TagMarkup for LinkTag {
    fn render(&self, _: &str, content: &str, attributes: &Attributes) -> String {
        let mut link = match attributes.get("url") {
            Some(url) => escape_html(url),
            None => Cow::Borrowed(content),
        };

        if !link.starts_with("http://") && !link.starts_with("https://") {
            link = Cow::Owned(format!("http://{link}"));
        }

        format!("<a href=\"{link}\" target=\"_blank\">{content}</a>")
    }
}

/// Inline code, with an optional `lang` attribute turned into a class.
/// # Exact output
/// ```html
/// <code class="lang">content</code>
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct CodeTag;

impl TagMarkup for CodeTag {
    fn render(&self, _: &str, content: &str, attributes: &Attributes) -> String {
        match attributes.get("lang") {
            Some(lang) => format!("<code class=\"{}\">{content}</code>", escape_html(lang)),
            None => format!("<code>{content}</code>"),
        }
    }
}

/// Returns the built-in tags, in registration order.
/// # Included tags
/// - `b`, `i`, `u`: `<b>`, `<i>`, `<u>`
/// - `text`: [PlainTextTag], no-nesting
/// - `img`: [ImageTag]
/// - `url`: [LinkTag]
/// - `code`: [CodeTag], no-nesting
pub fn default_tags() -> Vec<TagDescriptor> {
    let no_nesting = TagFlags::INSERT_LINE_BREAKS | TagFlags::NO_NESTING;

    vec![
        TagDescriptor::simple("b"),
        TagDescriptor::simple("i"),
        TagDescriptor::simple("u"),
        TagDescriptor::new("text", no_nesting, PlainTextTag),
        TagDescriptor::custom("img", ImageTag),
        TagDescriptor::custom("url", LinkTag),
        TagDescriptor::new("code", no_nesting, CodeTag),
    ]
}

impl HtmlSerializer {
    /// Construct a new serializer with [default_tags].
    pub fn with_default_tags() -> Self {
        Self::with_tags(default_tags())
    }
}
