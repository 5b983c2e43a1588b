//! Forgiving BBCode to HTML conversion.
//!
//! Conversion runs in three stages: the [Tokenizer] splits input into text and tag tokens, the [TreeBuilder]
//! matches tags into a tree, and the [HtmlSerializer] renders that tree. Malformed markup never fails; it comes
//! out as text.
//!
//! ```
//! use bbtree::HtmlSerializer;
//!
//! let html = HtmlSerializer::with_default_tags().serialize("[b]Hi[/b] [url=http://x.com]link[/url]");
//! assert_eq!(html, r#"<b>Hi</b> <a href="http://x.com" target="_blank">link</a>"#);
//! ```

mod error;
mod parser;
mod registry;
pub mod tree;

#[cfg(feature = "html_gen")]
pub mod html;

pub use error::ParseError;
pub use parser::{Lexer, ParserConfig, Token, TokenKind, Tokenizer, DEFAULT_MAX_DEPTH};
pub use registry::{Attributes, TagDescriptor, TagFlags, TagMarkup, TagRegistry, WrapInNamedElement};
pub use tree::{build_tree, Node, TreeBuilder};

#[cfg(feature = "html_gen")]
pub use html::{escape_html, HtmlSerializer, RenderFlags};
