//! Depth-first walk from rule tree to HTML body.

use crate::ast::{Declaration, Document, RuleNode};
use crate::config::GlobalConfig;
use crate::content::{self, escape_attribute};
use crate::element::{ElementEmission, Extracted};
use crate::error::Diagnostic;
use crate::loader::{self, Import, PageSource};
use crate::scope::{Scope, substitute, unescape_quotes, unquote, unquote_text};
use crate::stylesheet::StyleSheet;

/// Void elements without special attribute handling.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "input", "meta", "source", "track", "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Anchor,
    Image,
    Link,
    Script,
    Void,
    Generic,
}

impl ElementKind {
    fn of(tag: &str) -> Self {
        match tag {
            "a" => ElementKind::Anchor,
            "img" => ElementKind::Image,
            "link" => ElementKind::Link,
            "script" => ElementKind::Script,
            _ if VOID_TAGS.contains(&tag) => ElementKind::Void,
            _ => ElementKind::Generic,
        }
    }

    fn self_closing(self) -> bool {
        matches!(
            self,
            ElementKind::Image | ElementKind::Link | ElementKind::Void
        )
    }
}

/// Output of one walk.
#[derive(Debug)]
pub struct Emitted {
    pub body: String,
    pub config: GlobalConfig,
    pub styles: StyleSheet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Carries the walk's accumulators: stylesheet, page config, diagnostics and
/// the stack of imports being emitted.
pub struct Emitter<'a> {
    pages: &'a dyn PageSource,
    config: GlobalConfig,
    styles: StyleSheet,
    diagnostics: Vec<Diagnostic>,
    imports: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(pages: &'a dyn PageSource, config: GlobalConfig) -> Self {
        Self {
            pages,
            config,
            styles: StyleSheet::new(),
            diagnostics: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Mark `path` as in progress so the page cannot import itself.
    pub fn with_import_stack(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    pub fn emit_document(mut self, document: &Document, scope: &Scope<'_>) -> Emitted {
        let mut body = String::new();
        self.emit_nodes(&document.nodes, scope, &mut body);
        Emitted {
            body,
            config: self.config,
            styles: self.styles,
            diagnostics: self.diagnostics,
        }
    }

    pub fn emit_nodes(&mut self, nodes: &[RuleNode], scope: &Scope<'_>, out: &mut String) {
        for node in nodes {
            self.emit_node(node, scope, out);
        }
    }

    fn emit_node(&mut self, node: &RuleNode, scope: &Scope<'_>, out: &mut String) {
        if node.is_root() {
            self.config.apply_root(node);
            return;
        }
        if node.is_nested_reference() {
            log::warn!(
                "{}: '{}' has no enclosing element, ignoring it",
                node.span,
                node.selector
            );
            return;
        }

        let tag = node.selector.as_str();
        let kind = ElementKind::of(tag);
        log::debug!("{}: emitting <{}>", node.span, tag);

        let parts = Extracted::from_node(node);
        let mut frame = scope.child();
        for (name, decl) in &parts.variables {
            frame.bind(name, unquote_text(&decl.value));
        }

        let mut element = ElementEmission::new(tag);

        if parts.has_visual() {
            let class = self.styles.scoped_class(tag, node.span);
            element.visual = parts
                .visual
                .iter()
                .map(|decl| (decl.property.clone(), decl.value.clone()))
                .collect();
            element.sub_blocks = parts.sub_blocks.clone();
            self.styles
                .add_rule(tag, &class, &element.visual, &element.sub_blocks);
            element.push_attribute("class", class);
        }

        let content = parts
            .content
            .map(|decl| self.resolve(decl, &frame))
            .unwrap_or_default();
        let src = parts.src.map(|decl| self.resolve(decl, &frame));
        let touch_action = parts.touch_action.map(|decl| self.resolve(decl, &frame));
        let declares = |name: &str| parts.variables.iter().any(|(var, _)| *var == name);

        match kind {
            ElementKind::Link => {
                if let Some(src) = &src {
                    element.push_attribute("href", src.as_str());
                }
                if !declares("rel") {
                    element.push_attribute("rel", "stylesheet");
                }
            }
            ElementKind::Script => {
                if !declares("type") {
                    element.push_attribute("type", "module");
                }
                if let Some(src) = &src {
                    element.push_attribute("src", src.as_str());
                }
            }
            _ => {
                if let Some(src) = &src {
                    element.push_attribute("src", src.as_str());
                }
            }
        }
        if let Some(action) = touch_action {
            let name = if kind == ElementKind::Anchor {
                "href"
            } else {
                "onclick"
            };
            element.push_attribute(name, action);
        }
        if kind == ElementKind::Image && !content.is_empty() {
            element.push_attribute("alt", unescape_quotes(&content));
        }
        for (name, decl) in &parts.variables {
            element.push_attribute(*name, unquote_text(&decl.value));
        }

        element.content = match kind {
            ElementKind::Script if src.is_none() => content,
            ElementKind::Script => String::new(),
            _ if kind.self_closing() => String::new(),
            _ => content::render(&content, tag),
        };

        write_open_tag(&element, out);

        if kind.self_closing() || kind == ElementKind::Script {
            if !parts.children.is_empty() || parts.import.is_some() {
                log::warn!(
                    "{}: <{}> cannot hold children or imports, skipping them",
                    node.span,
                    tag
                );
            }
            if kind == ElementKind::Script {
                out.push('>');
                out.push_str(&element.content);
                out.push_str("</script>\n");
            } else {
                out.push_str(" />\n");
            }
            return;
        }

        out.push('>');
        if let Some(decl) = parts.import {
            self.splice_import(decl, &frame, out);
        }
        out.push_str(&element.content);
        for child in &parts.children {
            self.emit_node(child, &frame, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push_str(">\n");
    }

    /// Unquote a reserved value and substitute its variable references.
    fn resolve(&mut self, decl: &Declaration, scope: &Scope<'_>) -> String {
        let diagnostics = &mut self.diagnostics;
        substitute(unquote(&decl.value), scope, |name| {
            log::warn!(
                "{}: unbound variable --{} in '{}'",
                decl.span,
                name,
                decl.property
            );
            diagnostics.push(Diagnostic::UnboundVariable {
                name: name.to_string(),
                span: decl.span,
            });
        })
    }

    fn splice_import(&mut self, decl: &Declaration, scope: &Scope<'_>, out: &mut String) {
        let path = loader::normalize(unquote(&decl.value));

        match loader::resolve_import(self.pages, &path, &self.imports) {
            Ok(Import::Document(document)) => {
                log::debug!("{}: importing {} from {}", decl.span, path, self.pages.name());
                self.imports.push(path);
                self.emit_nodes(&document.nodes, scope, out);
                self.imports.pop();
            }
            Ok(Import::Verbatim(text)) => {
                log::debug!("{}: inlining {} from {}", decl.span, path, self.pages.name());
                out.push_str(&text);
            }
            Err(error) => {
                log::error!("{}: {}", decl.span, error);
                self.diagnostics.push(Diagnostic::Import {
                    path,
                    span: decl.span,
                    error,
                });
            }
        }
    }
}

fn write_open_tag(element: &ElementEmission, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
}
