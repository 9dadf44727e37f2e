//! Reading pages and resolving `--import` targets.

use crate::ast::Document;
use crate::error::ImportError;
use crate::parser;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extension of files that are compiled rather than inlined.
pub const DSL_EXTENSION: &str = "cssx";

/// Where pages live when nothing else is configured.
pub const DEFAULT_PAGES_DIR: &str = "src/pages";

/// Read access to the pages tree.
///
/// Paths are relative to the source's root, `/`-separated.
pub trait PageSource: Send + Sync + Debug {
    fn read(&self, path: &str) -> Result<Vec<u8>, ImportError>;

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// Pages on disk below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, refusing anything that could leave it.
    fn resolve(&self, path: &str) -> Result<PathBuf, ImportError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(ImportError::Escapes(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl Default for FilesystemSource {
    fn default() -> Self {
        Self::new(DEFAULT_PAGES_DIR)
    }
}

impl PageSource for FilesystemSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, ImportError> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ImportError::NotFound(path.to_string())
            } else {
                ImportError::Read {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "FilesystemSource"
    }
}

/// Pages held in memory, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.pages.insert(normalize(path), contents.into());
    }
}

impl PageSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, ImportError> {
        self.pages
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| ImportError::NotFound(path.to_string()))
    }

    fn name(&self) -> &'static str {
        "MemorySource"
    }
}

/// The result of resolving one import.
#[derive(Debug)]
pub enum Import {
    /// A `.cssx` file, parsed and ready to emit.
    Document(Document),
    /// Any other file, inlined as-is.
    Verbatim(String),
}

/// Drop surrounding whitespace and leading `./` segments.
pub fn normalize(path: &str) -> String {
    let mut path = path.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.to_string()
}

pub fn is_markup(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext == DSL_EXTENSION)
}

/// Read and, for `.cssx` targets, parse an import.
///
/// `in_progress` holds the imports currently being emitted, outermost first;
/// meeting one of them again is a cycle.
pub fn resolve_import(
    source: &dyn PageSource,
    path: &str,
    in_progress: &[String],
) -> Result<Import, ImportError> {
    let key = normalize(path);
    if key.is_empty() {
        return Err(ImportError::NotFound(path.to_string()));
    }
    if in_progress.contains(&key) {
        return Err(ImportError::Recursive(key));
    }

    let bytes = source.read(&key)?;
    let text = String::from_utf8(bytes).map_err(|_| ImportError::Encoding(key.clone()))?;

    if is_markup(&key) {
        parser::parse(&text)
            .map(Import::Document)
            .map_err(|source| ImportError::Parse { path: key, source })
    } else {
        Ok(Import::Verbatim(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pages")
    }

    fn fixtures() -> FilesystemSource {
        FilesystemSource::new(fixture_dir())
    }

    #[test]
    fn read_nested_file() {
        let bytes = fixtures().read("partials/banner.html").expect("read banner");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.contains("class=\"banner\""));
    }

    #[test]
    fn missing_file_error() {
        let err = fixtures().read("partials/missing.cssx").unwrap_err();
        assert_eq!(err, ImportError::NotFound("partials/missing.cssx".to_string()));
    }

    #[test]
    fn refuse_paths_outside_root() {
        let err = fixtures().read("../config/site.json").unwrap_err();
        assert!(matches!(err, ImportError::Escapes(_)));
        let err = fixtures().read("/etc/hostname").unwrap_err();
        assert!(matches!(err, ImportError::Escapes(_)));
        assert_eq!(fixtures().root(), fixture_dir().as_path());
    }

    #[test]
    fn parse_markup_imports() {
        let import = resolve_import(&fixtures(), "./partials/header.cssx", &[]).expect("import");
        match import {
            Import::Document(doc) => {
                assert_eq!(doc.nodes.len(), 1);
                assert_eq!(doc.nodes[0].selector, "header");
            }
            Import::Verbatim(_) => panic!("expected a parsed document"),
        }
    }

    #[test]
    fn inline_other_imports() {
        let import = resolve_import(&fixtures(), "partials/banner.html", &[]).expect("import");
        match import {
            Import::Verbatim(text) => assert!(text.starts_with("<div class=\"banner\">")),
            Import::Document(_) => panic!("expected verbatim text"),
        }
    }

    #[test]
    fn report_parse_failures() {
        let err = resolve_import(&fixtures(), "partials/broken.cssx", &[]).unwrap_err();
        match err {
            ImportError::Parse { path, source } => {
                assert_eq!(path, "partials/broken.cssx");
                assert_eq!(source.message, "unterminated block");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn detect_cycles() {
        let stack = vec!["cycle-a.cssx".to_string(), "cycle-b.cssx".to_string()];
        let err = resolve_import(&fixtures(), "./cycle-a.cssx", &stack).unwrap_err();
        assert_eq!(err, ImportError::Recursive("cycle-a.cssx".to_string()));
    }

    #[test]
    fn memory_source() {
        let source = MemorySource::new().with_page("./nav.cssx", "nav { color: red; }");
        assert!(source.read("nav.cssx").is_ok());
        assert!(matches!(
            source.read("footer.cssx"),
            Err(ImportError::NotFound(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let source = MemorySource::new().with_page("blob.bin", vec![0xff, 0xfe]);
        let err = resolve_import(&source, "blob.bin", &[]).unwrap_err();
        assert_eq!(err, ImportError::Encoding("blob.bin".to_string()));
    }

    #[test]
    fn markup_extension() {
        assert!(is_markup("a/b.cssx"));
        assert!(!is_markup("a/b.css"));
        assert!(!is_markup("cssx"));
    }
}
