//! Tag descriptors and the name-indexed registry the tokenizer and renderer consult.
use std::collections::HashMap;

use bitflags::bitflags;
use static_assertions::{assert_impl_all, assert_obj_safe};

/// Attributes parsed off a start tag, keyed by lowercased attribute name.
/// # Remarks
/// Nothing downstream depends on iteration order.
pub type Attributes = HashMap<String, String>;

bitflags! {
    /// Line-break and nesting policy for a tag.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TagFlags: u8 {
        /// Convert newlines inside the tag's content to `<br>`.
        const INSERT_LINE_BREAKS = 1 << 0;
        /// Stop the text following this tag from having its newlines converted.
        const SUPPRESS_LINE_BREAKS = 1 << 1;
        /// Treat the tag's body as literal text, even if it contains tag syntax.
        const NO_NESTING = 1 << 2;
    }
}

/// Produces the HTML for one closed tag.
pub trait TagMarkup: Send + Sync {
    /// Wrap the already rendered `content` of tag `name`.
    /// # Remarks
    /// `content` is final HTML. An implementation that places attribute values in the output is responsible
    /// for escaping them.
    fn render(&self, name: &str, content: &str, attributes: &Attributes) -> String;
}

assert_obj_safe!(TagMarkup);

impl<F> TagMarkup for F
where
    F: Fn(&str, &str, &Attributes) -> String + Send + Sync,
{
    fn render(&self, name: &str, content: &str, attributes: &Attributes) -> String {
        self(name, content, attributes)
    }
}

/// The markup used when a descriptor is built without a generator: `<name>content</name>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct WrapInNamedElement;

impl TagMarkup for WrapInNamedElement {
    fn render(&self, name: &str, content: &str, _: &Attributes) -> String {
        format!("<{name}>{content}</{name}>")
    }
}

/// Everything the converter knows about one tag.
pub struct TagDescriptor {
    name: String,
    flags: TagFlags,
    markup: Box<dyn TagMarkup>,
}

impl TagDescriptor {
    /// Construct a descriptor with explicit flags and markup generator.
    pub fn new(name: impl Into<String>, flags: TagFlags, markup: impl TagMarkup + 'static) -> Self {
        Self {
            name: name.into(),
            flags,
            markup: Box::new(markup),
        }
    }

    /// Construct a descriptor that uses the default `<name>content</name>` markup.
    pub fn with_flags(name: impl Into<String>, flags: TagFlags) -> Self {
        Self::new(name, flags, WrapInNamedElement)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    pub fn insert_line_breaks(&self) -> bool {
        self.flags.contains(TagFlags::INSERT_LINE_BREAKS)
    }

    pub fn suppress_line_breaks(&self) -> bool {
        self.flags.contains(TagFlags::SUPPRESS_LINE_BREAKS)
    }

    pub fn no_nesting(&self) -> bool {
        self.flags.contains(TagFlags::NO_NESTING)
    }

    /// Run this tag's markup generator over rendered content.
    pub fn render(&self, content: &str, attributes: &Attributes) -> String {
        self.markup.render(&self.name, content, attributes)
    }
}

impl std::fmt::Debug for TagDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Ordered set of tag descriptors, looked up by name.
/// # Remarks
/// Registering a name twice keeps both descriptors in order, but lookups resolve to the last one.
/// Treat the registry as read-only once conversions start; it is shareable across threads.
#[derive(Debug, Default)]
pub struct TagRegistry {
    tags: Vec<TagDescriptor>,
    by_name: HashMap<String, usize>,
}

assert_impl_all!(TagRegistry: Send, Sync);

impl TagRegistry {
    /// Construct a registry with no tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct a registry from the given tags, in order.
    pub fn with_tags(tags: Vec<TagDescriptor>) -> Self {
        let mut registry = Self::empty();
        registry.register_tags(tags);
        registry
    }

    /// Register the provided tag to the registry.
    pub fn register_tag(&mut self, tag: TagDescriptor) {
        self.by_name.insert(tag.name.clone(), self.tags.len());
        self.tags.push(tag);
    }

    /// Register the provided tags to the registry.
    pub fn register_tags(&mut self, tags: impl IntoIterator<Item = TagDescriptor>) {
        for tag in tags {
            self.register_tag(tag);
        }
    }

    /// Attempt to locate the descriptor for the given tag, if one exists.
    pub fn get(&self, name: &str) -> Option<&TagDescriptor> {
        self.by_name.get(name).map(|&idx| &self.tags[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All registered descriptors in registration order, shadowed ones included.
    pub fn iter(&self) -> impl Iterator<Item = &TagDescriptor> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<TagDescriptor> for TagRegistry {
    fn from_iter<I: IntoIterator<Item = TagDescriptor>>(iter: I) -> Self {
        let mut registry = Self::empty();
        registry.register_tags(iter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn default_markup_wraps_in_name() {
        let tag = TagDescriptor::with_flags("b", TagFlags::INSERT_LINE_BREAKS);
        assert_eq!(tag.render("hi", &Attributes::new()), "<b>hi</b>");
    }

    #[test]
    pub fn closure_markup() {
        let tag = TagDescriptor::new("color", TagFlags::empty(), |_: &str, content: &str, attr: &Attributes| {
            format!("<span style=\"color:{}\">{content}</span>", attr["color"])
        });
        let attributes = Attributes::from([("color".to_owned(), "red".to_owned())]);
        assert_eq!(tag.render("x", &attributes), "<span style=\"color:red\">x</span>");
    }

    #[test]
    pub fn last_registered_wins() {
        let registry = TagRegistry::with_tags(vec![
            TagDescriptor::with_flags("code", TagFlags::empty()),
            TagDescriptor::with_flags("code", TagFlags::NO_NESTING),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.get("code").unwrap().no_nesting());
        assert!(registry.get("pre").is_none());
    }

    #[test]
    pub fn flag_accessors() {
        let tag = TagDescriptor::with_flags("x", TagFlags::SUPPRESS_LINE_BREAKS | TagFlags::NO_NESTING);
        assert!(!tag.insert_line_breaks());
        assert!(tag.suppress_line_breaks());
        assert!(tag.no_nesting());
    }
}
