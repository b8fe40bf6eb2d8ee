//! Start tag model used for rewriting resource references.
//!
//! Only the opening tag of a resource element is kept. Attributes stay in
//! source order and values are stored exactly as written (no entity
//! decoding), so an untouched tag serializes back to equivalent text.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagElement {
    name: String,
    attrs: Vec<(String, Option<String>)>,
    self_closing: bool,
}

impl TagElement {
    /// Parse opening tag text like `<script src="a.js" defer>`.
    pub fn parse(source: &str) -> Option<Self> {
        let inner = source.trim().strip_prefix('<')?.strip_suffix('>')?;
        let (inner, self_closing) = match inner.trim_end().strip_suffix('/') {
            Some(rest) => (rest, true),
            None => (inner, false),
        };

        let name_end = inner
            .find(|c: char| c.is_whitespace())
            .unwrap_or(inner.len());
        let name = &inner[..name_end];
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_ascii_lowercase(),
            attrs: parse_attributes(&inner[name_end..]),
            self_closing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Update in place, or append when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.attrs.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(attr) => attr.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Returns whether the attribute was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.attrs.len() != before
    }

    /// Serialize the opening tag. Pages get this text substituted for the
    /// tag as originally written.
    pub fn start_tag(&self) -> String {
        let mut out = format!("<{}", self.name);
        for (name, value) in &self.attrs {
            match value {
                None => {
                    let _ = write!(out, " {name}");
                }
                Some(v) if v.contains('"') && !v.contains('\'') => {
                    let _ = write!(out, " {name}='{v}'");
                }
                Some(v) => {
                    let _ = write!(out, " {name}=\"{}\"", v.replace('"', "&quot;"));
                }
            }
        }
        out.push_str(if self.self_closing { " />" } else { ">" });
        out
    }
}

/// Byte length of the opening tag at the start of `raw` (through its `>`).
///
/// Quoted attribute values may contain `>`.
pub fn start_tag_len(raw: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Parse attributes from a tag's attribute region, keeping source order.
///
/// Boolean attributes (no `=`) have no value.
pub fn parse_attributes(s: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }

        // Read attribute name
        let mut name = String::from(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next.is_whitespace() {
                break;
            }
            name.push(next);
            chars.next();
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            attrs.push((name, None));
            continue;
        }
        chars.next();

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
        }
        attrs.push((name, Some(value)));
    }

    attrs
}
