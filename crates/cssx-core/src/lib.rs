//! Compiles CSSX pages, nested `selector { ... }` documents, into HTML.
//!
//! Selector nesting becomes element nesting. Plain declarations become a
//! rule scoped to the element through a generated class. A few reserved
//! declarations carry element semantics instead: `content`, `src`,
//! `touch-action`, `--name` variables and `--import`.
//!
//! ```ignore
//! let html = cssx_core::transpile("h1 { color: navy; content: \"Hello\"; }")?;
//! ```

pub mod ast;
pub mod config;
pub mod content;
pub mod document;
pub mod element;
pub mod emitter;
pub mod error;
pub mod loader;
pub mod parser;
pub mod scope;
pub mod stylesheet;

pub use config::GlobalConfig;
pub use error::{CssxError, Diagnostic, ImportError, Span, SyntaxError};
pub use loader::{FilesystemSource, MemorySource, PageSource};

use ast::{Document, RuleNode};
use element::{Property, classify};
use emitter::Emitter;
use scope::{Scope, unquote_text};

const BODY_TAG: &str = "body";

/// One compiled page.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    /// Settings after `:root` overrides.
    pub config: GlobalConfig,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles pages against a page source and a set of site defaults.
///
/// Every call starts again from the defaults, so a transpiler can be shared
/// between threads compiling different pages.
#[derive(Debug)]
pub struct Transpiler {
    pages: Box<dyn PageSource>,
    defaults: GlobalConfig,
}

impl Default for Transpiler {
    fn default() -> Self {
        Self {
            pages: Box::new(FilesystemSource::default()),
            defaults: GlobalConfig::default(),
        }
    }
}

impl Transpiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source used to resolve `--import` (and pages for [`Self::transpile_page`]).
    pub fn with_pages(mut self, pages: impl PageSource + 'static) -> Self {
        self.pages = Box::new(pages);
        self
    }

    pub fn with_defaults(mut self, defaults: GlobalConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Compile source text. Syntax errors are fatal, import problems are not.
    pub fn transpile(&self, input: &str) -> Result<Page, CssxError> {
        self.render(input, None)
    }

    /// Read `path` from the page source and compile it.
    pub fn transpile_page(&self, path: &str) -> Result<Page, CssxError> {
        let key = loader::normalize(path);
        let bytes = self.pages.read(&key).map_err(CssxError::Page)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| CssxError::Page(ImportError::Encoding(key.clone())))?;
        self.render(&text, Some(key))
    }

    fn render(&self, input: &str, path: Option<String>) -> Result<Page, CssxError> {
        let (doc, wrapped) = fold_into_body(parser::parse(input)?);

        let mut config = self.defaults.clone();
        let mut scope = Scope::new();
        for root in doc.roots() {
            config.apply_root(root);
            for decl in &root.declarations {
                if let Property::Variable(name) = classify(&decl.property) {
                    scope.bind(name, unquote_text(&decl.value));
                }
            }
        }

        let mut emitter = Emitter::new(self.pages.as_ref(), config);
        if let Some(path) = path {
            emitter = emitter.with_import_stack(path);
        }
        let emitted = emitter.emit_document(&doc, &scope);

        let html = document::assemble(
            &emitted.config,
            emitted.styles,
            &emitted.body,
            wrapped,
        );

        Ok(Page {
            html,
            config: emitted.config,
            diagnostics: emitted.diagnostics,
        })
    }
}

/// A page that opens with its own `body` element keeps it as the wrapper.
/// Top-level elements after it move inside, in order.
fn fold_into_body(doc: Document) -> (Document, bool) {
    let is_element = |node: &RuleNode| !node.is_root() && !node.is_nested_reference();
    let Some(first) = doc.nodes.iter().position(is_element) else {
        return (doc, false);
    };
    if doc.nodes[first].selector != BODY_TAG {
        return (doc, false);
    }

    let mut nodes = Vec::with_capacity(doc.nodes.len());
    let mut siblings = Vec::new();
    for (index, node) in doc.nodes.into_iter().enumerate() {
        if index > first && is_element(&node) {
            siblings.push(node);
        } else {
            nodes.push(node);
        }
    }
    nodes[first].children.extend(siblings);
    (Document { nodes }, true)
}

/// Compile with default settings, returning only the HTML.
pub fn transpile(input: &str) -> Result<String, CssxError> {
    Transpiler::new().transpile(input).map(|page| page.html)
}
