use std::borrow::Cow;

use pretty_assertions::assert_eq;

use crate::{
    registry::{Attributes, TagDescriptor, TagFlags, TagRegistry},
    tree::{build_tree, Node, TreeBuilder},
    ParseError, ParserConfig,
};

fn registry() -> TagRegistry {
    ["b", "i", "list", "*"]
        .into_iter()
        .map(|name| TagDescriptor::with_flags(name, TagFlags::INSERT_LINE_BREAKS))
        .chain([TagDescriptor::with_flags("code", TagFlags::NO_NESTING)])
        .collect()
}

fn text(content: &str) -> Node<'_> {
    Node::Text {
        content: Cow::Borrowed(content),
    }
}

fn tag<'a>(name: &'a str, closed: bool, children: Vec<Node<'a>>) -> Node<'a> {
    Node::Tag {
        name: Cow::Borrowed(name),
        attributes: Attributes::new(),
        children,
        closed,
    }
}

fn children_of<'a>(input: &'a str, registry: &TagRegistry) -> Vec<Node<'a>> {
    build_tree(input, registry).unwrap().children().to_vec()
}

#[test]
pub fn root_holds_source() {
    let input = "plain";
    let root = build_tree(input, &registry()).unwrap();
    assert!(matches!(root, Node::Root { source: "plain", .. }));
    assert_eq!(root.children(), &[text("plain")]);
    assert_eq!(root.to_string(), "Root - plain");
}

#[test]
pub fn nested_tags() {
    assert_eq!(
        children_of("a[b]x[i]y[/i][/b]", &registry()),
        vec![
            text("a"),
            tag("b", true, vec![text("x"), tag("i", true, vec![text("y")])]),
        ]
    );
}

#[test]
pub fn unclosed_tag_is_kept_open() {
    assert_eq!(
        children_of("[b]bold", &registry()),
        vec![tag("b", false, vec![text("bold")])]
    );
}

#[test]
pub fn mismatched_end_tag_is_dropped() {
    assert_eq!(
        children_of("[b]x[/i]y[/b]", &registry()),
        vec![tag("b", true, vec![text("x"), text("y")])]
    );
}

#[test]
pub fn stray_end_tag_at_root_is_dropped() {
    assert_eq!(children_of("[/b]x", &registry()), vec![text("x")]);
}

#[test]
pub fn out_of_order_close() {
    // [/b] does not match the open [i], so it is dropped and both tags stay open.
    assert_eq!(
        children_of("[b][i]x[/b][/i]", &registry()),
        vec![tag("b", false, vec![tag("i", true, vec![text("x")])])]
    );
}

#[test]
pub fn self_closing_items() {
    assert_eq!(
        children_of("[list][*]one[*]two[/list]", &registry()),
        vec![tag(
            "list",
            true,
            vec![
                tag("*", true, vec![text("one")]),
                tag("*", true, vec![text("two")]),
            ]
        )]
    );
}

#[test]
pub fn self_closing_item_closes_before_nested_tag() {
    assert_eq!(
        children_of("[*]a[b]x[/b]", &registry()),
        vec![tag("*", true, vec![text("a")]), tag("b", true, vec![text("x")])]
    );
}

#[test]
pub fn self_closing_item_at_end_of_input() {
    assert_eq!(
        children_of("[*]last", &registry()),
        vec![tag("*", false, vec![text("last")])]
    );
}

#[test]
pub fn attributes_carried_to_node() {
    let registry = TagRegistry::with_tags(vec![TagDescriptor::with_flags("url", TagFlags::empty())]);
    let children = children_of("[url=x.com]y[/url]", &registry);
    let Node::Tag { attributes, .. } = &children[0] else {
        panic!("expected a tag node, got {:?}", children[0]);
    };
    assert_eq!(attributes["url"], "x.com");
    assert_eq!(children[0].to_string(), "Tag - url");
}

#[test]
pub fn no_nesting_body_is_single_text() {
    assert_eq!(
        children_of("[code][b]x[/b][/code]", &registry()),
        vec![tag("code", true, vec![text("[b]x[/b]")])]
    );
}

#[test]
pub fn nesting_limit() {
    let registry = registry();
    let builder = TreeBuilder::new(&registry).with_config(ParserConfig { max_depth: 2 });

    assert!(builder.build("[b][i]x[/i][/b]").is_ok());
    assert_eq!(
        builder.build("[b][i][b]x[/b][/i][/b]"),
        Err(ParseError::NestingTooDeep { limit: 2 })
    );
}

#[test]
pub fn deep_input_fails_instead_of_overflowing() {
    let input = "[b]".repeat(100_000);
    assert!(matches!(
        build_tree(&input, &registry()),
        Err(ParseError::NestingTooDeep { .. })
    ));
}

#[test]
pub fn validity() {
    assert!(build_tree("[b]x[/b]", &registry()).unwrap().is_valid());
    assert!(text("leaf").is_valid());

    let nested_root = tag(
        "b",
        true,
        vec![Node::Root {
            source: "",
            children: vec![],
        }],
    );
    assert!(!nested_root.is_valid());
}
