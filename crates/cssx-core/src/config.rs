use crate::ast::RuleNode;
use crate::error::CssxError;
use crate::scope::unquote_text;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Page-level settings used by the document head.
///
/// Starts from hard defaults (or a JSON file of site defaults) and is
/// overridden per page by declarations in `:root`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub lang: String,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub generator: String,
    pub transition: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            icon: "favicon.svg".to_string(),
            title: "CSSX".to_string(),
            description: "Site generated with CSSX".to_string(),
            generator: format!("CSSX v{}", env!("CARGO_PKG_VERSION")),
            transition: false,
        }
    }
}

impl GlobalConfig {
    /// Load site defaults from a JSON file. Missing keys keep their hard default.
    pub fn load(path: &Path) -> Result<Self, CssxError> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|source| CssxError::Config {
            path: path.display().to_string(),
            source,
        })
    }

    /// Set one field by its `:root` name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let name = name.strip_prefix("--").unwrap_or(name);
        let value = unquote_text(value);
        match name {
            "lang" => self.lang = value,
            "icon" => self.icon = value,
            "title" => self.title = value,
            "description" => self.description = value,
            "generator" => self.generator = value,
            "transition" => self.transition = parse_flag(&value),
            _ => return false,
        }
        true
    }

    /// Fold every declaration of a `:root` block into this config.
    pub fn apply_root(&mut self, node: &RuleNode) {
        for decl in &node.declarations {
            if !self.set(&decl.property, &decl.value) {
                log::debug!("{}: '{}' is not a page setting", decl.span, decl.property);
            }
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "auto"
    )
}
