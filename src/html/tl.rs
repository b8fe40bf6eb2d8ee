//! [`HtmlParser`] backed by the `tl` parser.

use super::tag::start_tag_len;
use super::{HtmlParser, ResourceTags, SourceElement, TagElement, is_script, is_stylesheet};

#[derive(Debug, Default, Clone, Copy)]
pub struct TlParser;

impl HtmlParser for TlParser {
    fn parse(&self, content: &str) -> Result<ResourceTags, String> {
        let normalized = mask_unquoted_slashes(content);
        let dom =
            tl::parse(&normalized, tl::ParserOptions::default()).map_err(|e| format!("{e:?}"))?;
        let parser = dom.parser();
        let mut tags = ResourceTags::default();

        for node in dom.nodes() {
            let Some(tag) = node.as_tag() else {
                continue;
            };
            let name = tag.name().as_utf8_str();
            let is_link = name.eq_ignore_ascii_case("link");
            if !is_link && !name.eq_ignore_ascii_case("script") {
                continue;
            }

            // offsets are shared with `content`; only the opening tag is replaced later
            let (start, _) = tag.boundaries(parser);
            let Some(raw) = content.get(start..) else {
                continue;
            };
            let Some(len) = start_tag_len(raw) else {
                continue;
            };
            let source = raw[..len].to_string();
            let Some(element) = TagElement::parse(&source) else {
                continue;
            };

            if is_link && is_stylesheet(&element) {
                tags.css.push(SourceElement { element, source });
            } else if !is_link && is_script(&element) {
                tags.js.push(SourceElement { element, source });
            }
        }

        Ok(tags)
    }
}

/// Copy of `content` where `/` inside unquoted attribute values is replaced
/// by `_`, byte for byte.
///
/// `tl` ends an unquoted value at `/`, so `<script src=js/app.js>` (the form
/// html minifiers write) would otherwise lose its `src`. Byte offsets are
/// unchanged, so spans found in the copy index the original text.
fn mask_unquoted_slashes(content: &str) -> String {
    let mut out = content.as_bytes().to_vec();
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' || !bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            i += 1;
            continue;
        }
        i += 1;
        let mut quote = None;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => break,
                None if b == b'=' => {
                    let mut j = i + 1;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j] != b'"' && bytes[j] != b'\'' {
                        while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                            if bytes[j] == b'/' {
                                out[j] = b'_';
                            }
                            j += 1;
                        }
                        i = j;
                        continue;
                    }
                }
                None => {}
            }
            i += 1;
        }
    }
    // only ascii bytes were swapped for ascii bytes
    String::from_utf8(out).unwrap_or_else(|_| content.to_string())
}
