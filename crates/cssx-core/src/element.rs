//! Splits a rule node's declarations into element semantics and CSS.

use crate::ast::{Declaration, RuleNode};

pub const CONTENT: &str = "content";
pub const SRC: &str = "src";
pub const TOUCH_ACTION: &str = "touch-action";
pub const IMPORT: &str = "--import";

/// What a declaration name means to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property<'a> {
    Content,
    Src,
    TouchAction,
    Import,
    /// `--name`, carried without the prefix.
    Variable(&'a str),
    Visual,
}

/// Classify a property name. Matching is exact and case-sensitive.
pub fn classify(property: &str) -> Property<'_> {
    match property {
        CONTENT => Property::Content,
        SRC => Property::Src,
        TOUCH_ACTION => Property::TouchAction,
        IMPORT => Property::Import,
        _ => match property.strip_prefix("--") {
            Some(name) if !name.is_empty() => Property::Variable(name),
            _ => Property::Visual,
        },
    }
}

/// A `&`-prefixed block folded into its parent's rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBlock {
    pub selector: String,
    pub body: String,
}

/// The reserved and visual parts of one rule node, in source order.
#[derive(Debug, Default)]
pub struct Extracted<'n> {
    pub content: Option<&'n Declaration>,
    pub src: Option<&'n Declaration>,
    pub touch_action: Option<&'n Declaration>,
    pub import: Option<&'n Declaration>,
    pub variables: Vec<(&'n str, &'n Declaration)>,
    pub visual: Vec<&'n Declaration>,
    pub sub_blocks: Vec<SubBlock>,
    pub children: Vec<&'n RuleNode>,
}

impl<'n> Extracted<'n> {
    pub fn from_node(node: &'n RuleNode) -> Self {
        let mut out = Extracted::default();

        for decl in &node.declarations {
            match classify(&decl.property) {
                Property::Content => out.content = Some(decl),
                Property::Src => out.src = Some(decl),
                Property::TouchAction => out.touch_action = Some(decl),
                Property::Import => out.import = Some(decl),
                Property::Variable(name) => out.variables.push((name, decl)),
                Property::Visual => out.visual.push(decl),
            }
        }

        for child in &node.children {
            if child.is_nested_reference() {
                let body = block_body(child);
                match out
                    .sub_blocks
                    .iter_mut()
                    .find(|block| block.selector == child.selector)
                {
                    Some(block) => {
                        block.body.push(' ');
                        block.body.push_str(&body);
                    }
                    None => out.sub_blocks.push(SubBlock {
                        selector: child.selector.clone(),
                        body,
                    }),
                }
            } else {
                out.children.push(child);
            }
        }

        out
    }

    /// Sub-selector styling counts: the element needs a class for it to apply.
    pub fn has_visual(&self) -> bool {
        !self.visual.is_empty() || !self.sub_blocks.is_empty()
    }
}

/// CSS text of a sub-selector block. Everything inside is plain CSS, nested
/// rules included.
fn block_body(node: &RuleNode) -> String {
    let mut parts: Vec<String> = node
        .declarations
        .iter()
        .map(|decl| format!("{}: {};", decl.property, decl.value))
        .collect();
    for child in &node.children {
        parts.push(format!("{} {{ {} }}", child.selector, block_body(child)));
    }
    parts.join(" ")
}

/// Everything the emitter knows about one element before writing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementEmission {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub content: String,
    pub visual: Vec<(String, String)>,
    pub sub_blocks: Vec<SubBlock>,
}

impl ElementEmission {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Add an attribute unless one with the same name is already set.
    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.has_attribute(&name) {
            self.attributes.push((name, value.into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn classify_reserved_names() {
        assert_eq!(classify("content"), Property::Content);
        assert_eq!(classify("src"), Property::Src);
        assert_eq!(classify("touch-action"), Property::TouchAction);
        assert_eq!(classify("--import"), Property::Import);
        assert_eq!(classify("--title"), Property::Variable("title"));
        assert_eq!(classify("--Import"), Property::Variable("Import"));
        assert_eq!(classify("Content"), Property::Visual);
        assert_eq!(classify("color"), Property::Visual);
        assert_eq!(classify("--"), Property::Visual);
    }

    #[test]
    fn extract_preserves_order() {
        let doc = parse(
            "a { color: red; --href: \"/x\"; content: \"Go\"; margin: 0; --rel: \"me\"; span { color: blue; } }",
        )
        .expect("parse");
        let parts = Extracted::from_node(&doc.nodes[0]);

        let visual: Vec<&str> = parts.visual.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(visual, vec!["color", "margin"]);
        let vars: Vec<&str> = parts.variables.iter().map(|(name, _)| *name).collect();
        assert_eq!(vars, vec!["href", "rel"]);
        assert_eq!(parts.content.map(|d| d.value.as_str()), Some("\"Go\""));
        assert_eq!(parts.children.len(), 1);
        assert!(parts.has_visual());
    }

    #[test]
    fn last_reserved_declaration_wins() {
        let doc = parse("p { content: \"one\"; content: \"two\"; }").expect("parse");
        let parts = Extracted::from_node(&doc.nodes[0]);
        assert_eq!(parts.content.map(|d| d.value.as_str()), Some("\"two\""));
        assert!(!parts.has_visual());
    }

    #[test]
    fn fold_sub_selector_blocks() {
        let doc = parse(
            "a { &:hover { color: red; content: \"x\"; } &:hover { text-decoration: underline; } & > span { b { color: blue; } } }",
        )
        .expect("parse");
        let parts = Extracted::from_node(&doc.nodes[0]);

        assert!(parts.children.is_empty());
        assert!(parts.visual.is_empty());
        assert!(parts.has_visual());
        assert_eq!(parts.sub_blocks.len(), 2);
        assert_eq!(parts.sub_blocks[0].selector, "&:hover");
        assert_eq!(
            parts.sub_blocks[0].body,
            "color: red; content: \"x\"; text-decoration: underline;"
        );
        assert_eq!(parts.sub_blocks[1].selector, "& > span");
        assert_eq!(parts.sub_blocks[1].body, "b { color: blue; }");
    }

    #[test]
    fn push_attribute_keeps_first() {
        let mut emission = ElementEmission::new("a");
        emission.push_attribute("href", "/first");
        emission.push_attribute("href", "/second");
        assert_eq!(emission.attributes, vec![("href".to_string(), "/first".to_string())]);
    }
}
