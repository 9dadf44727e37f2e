use std::collections::HashMap;

/// Variable bindings visible to one element and its descendants.
///
/// Frames are layered: a child frame only stores its own overrides and falls
/// back to its parent on lookup, so descending costs nothing for elements that
/// declare no variables.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    bindings: HashMap<String, String>,
}

impl<'p> Scope<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Scope<'_> {
        Scope {
            parent: Some(self),
            bindings: HashMap::new(),
        }
    }

    /// Bind `name` (with or without the leading `--`) in this frame only.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) {
        let name = name.strip_prefix("--").unwrap_or(name);
        self.bindings.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix("--").unwrap_or(name);
        match self.bindings.get(name) {
            Some(value) => Some(value.as_str()),
            None => self.parent.and_then(|parent| parent.get(name)),
        }
    }
}

/// Strip one pair of matching surrounding quotes.
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Drop the backslash from `\"` and `\'` escapes.
pub fn unescape_quotes(value: &str) -> String {
    value.replace("\\\"", "\"").replace("\\'", "'")
}

/// Unquote a value that is written out as plain text, like an attribute.
pub fn unquote_text(value: &str) -> String {
    unescape_quotes(unquote(value))
}

/// Replace every `var(--name)` in `input` with its binding in `scope`.
///
/// Single pass, left to right; substituted text is not scanned again.
/// `var(--name, fallback)` falls back to the unquoted fallback. Unbound names
/// without a fallback keep the literal reference and are reported to
/// `on_unbound`.
pub fn substitute(input: &str, scope: &Scope<'_>, mut on_unbound: impl FnMut(&str)) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + "var(".len()..];

        let Some(close) = find_closing_paren(after) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let reference = &rest[start..start + "var(".len() + close + 1];
        let inner = after[..close].trim();

        match inner.strip_prefix("--") {
            Some(body) => {
                let (name, fallback) = match body.split_once(',') {
                    Some((name, fallback)) => (name.trim(), Some(unquote(fallback))),
                    None => (body.trim(), None),
                };
                match (scope.get(name), fallback) {
                    (Some(value), _) => out.push_str(value),
                    (None, Some(fallback)) => out.push_str(fallback),
                    (None, None) => {
                        on_unbound(name);
                        out.push_str(reference);
                    }
                }
            }
            None => out.push_str(reference),
        }

        rest = &rest[start + reference.len()..];
    }

    out.push_str(rest);
    out
}

fn find_closing_paren(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}
