use crate::element::SubBlock;
use crate::error::Span;
use std::collections::HashSet;

pub const CLASS_PREFIX: &str = "cssx-";

/// Scoped rules in emission order. Append-only.
#[derive(Debug, Default)]
pub struct StyleSheet {
    rules: Vec<String>,
    issued: HashSet<String>,
    ordinal: u64,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A class name unique within this stylesheet, derived from the tag and
    /// the rule's source position.
    pub fn scoped_class(&mut self, tag: &str, span: Span) -> String {
        loop {
            self.ordinal += 1;
            let class = format!("{}{:08x}", CLASS_PREFIX, fnv1a(tag, span, self.ordinal));
            if self.issued.insert(class.clone()) {
                return class;
            }
        }
    }

    /// Append `tag.class { ... }` with the sub-selector blocks nested inside.
    pub fn add_rule(
        &mut self,
        tag: &str,
        class: &str,
        declarations: &[(String, String)],
        sub_blocks: &[SubBlock],
    ) {
        let mut out = String::new();
        emit_rule(tag, class, declarations, sub_blocks, &mut out);
        self.rules.push(out);
    }

    pub fn push(&mut self, rule: impl Into<String>) {
        self.rules.push(rule.into());
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.rules.join("\n")
    }
}

fn emit_rule(
    tag: &str,
    class: &str,
    declarations: &[(String, String)],
    sub_blocks: &[SubBlock],
    out: &mut String,
) {
    out.push_str(tag);
    out.push('.');
    out.push_str(class);
    out.push_str(" {");

    for (property, value) in declarations {
        emit_declaration(property, value, out);
    }
    for block in sub_blocks {
        out.push(' ');
        out.push_str(&block.selector);
        out.push_str(" { ");
        out.push_str(&block.body);
        out.push_str(" }");
    }
    out.push_str(" }");
}

fn emit_declaration(property: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(property);
    out.push_str(": ");
    out.push_str(value);
    out.push(';');
}

fn fnv1a(tag: &str, span: Span, ordinal: u64) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let bytes = tag
        .bytes()
        .chain(span.line.to_le_bytes())
        .chain(span.column.to_le_bytes())
        .chain(ordinal.to_le_bytes());

    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(p, v)| (p.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn class_shape() {
        let mut sheet = StyleSheet::new();
        let class = sheet.scoped_class("h1", Span::new(1, 1));
        assert!(class.starts_with(CLASS_PREFIX));
        let hash = &class[CLASS_PREFIX.len()..];
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identical_elements_get_distinct_classes() {
        let mut sheet = StyleSheet::new();
        let a = sheet.scoped_class("p", Span::new(4, 2));
        let b = sheet.scoped_class("p", Span::new(4, 2));
        assert_ne!(a, b);
    }

    #[test]
    fn classes_are_deterministic_per_invocation() {
        let mut first = StyleSheet::new();
        let mut second = StyleSheet::new();
        assert_eq!(
            first.scoped_class("nav", Span::new(2, 1)),
            second.scoped_class("nav", Span::new(2, 1))
        );
    }

    #[test]
    fn rule_format() {
        let mut sheet = StyleSheet::new();
        sheet.add_rule(
            "body",
            "cssx-0000abcd",
            &decls(&[("font-size", "16px"), ("margin", "0")]),
            &[],
        );
        assert_eq!(
            sheet.rules()[0],
            "body.cssx-0000abcd { font-size: 16px; margin: 0; }"
        );
    }

    #[test]
    fn rule_with_sub_blocks() {
        let mut sheet = StyleSheet::new();
        sheet.add_rule(
            "a",
            "cssx-1",
            &decls(&[("color", "red")]),
            &[SubBlock {
                selector: "&:hover".to_string(),
                body: "color: blue;".to_string(),
            }],
        );
        assert_eq!(
            sheet.to_css(),
            "a.cssx-1 { color: red; &:hover { color: blue; } }"
        );
    }

    #[test]
    fn keeps_emission_order() {
        let mut sheet = StyleSheet::new();
        sheet.add_rule("b", "cssx-2", &decls(&[("color", "red")]), &[]);
        sheet.add_rule("a", "cssx-1", &decls(&[("color", "red")]), &[]);
        sheet.push("@view-transition { navigation: auto; }");
        assert_eq!(sheet.len(), 3);
        assert!(sheet.rules()[0].starts_with("b.cssx-2"));
        assert!(sheet.rules()[1].starts_with("a.cssx-1"));
        assert_eq!(sheet.to_css().lines().count(), 3);
    }
}
