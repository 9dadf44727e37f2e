use crate::error::Span;

/// Selector of the global configuration block.
pub const ROOT_SELECTOR: &str = ":root";

/// Prefix of selectors that refer back to the enclosing element.
pub const NESTING_MARKER: char = '&';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub children: Vec<RuleNode>,
    pub span: Span,
}

impl RuleNode {
    pub fn is_root(&self) -> bool {
        self.selector == ROOT_SELECTOR
    }

    /// `&:hover`, `& > span` and friends: styling for the parent, not a new element.
    pub fn is_nested_reference(&self) -> bool {
        self.selector.starts_with(NESTING_MARKER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<RuleNode>,
}

impl Document {
    pub fn roots(&self) -> impl Iterator<Item = &RuleNode> {
        self.nodes.iter().filter(|node| node.is_root())
    }

    /// Top-level nodes that become page elements.
    pub fn elements(&self) -> impl Iterator<Item = &RuleNode> {
        self.nodes
            .iter()
            .filter(|node| !node.is_root() && !node.is_nested_reference())
    }
}
