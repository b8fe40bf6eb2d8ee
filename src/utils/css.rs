//! Scanning and rewriting `url(..)` / `@import ".."` references in stylesheets.

use crate::utils::url::is_data;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"url[ \t\r\n\f]*\([ \t\r\n\f]*['"]?(?P<url>[^'")]*)|@import[ \t\r\n\f]+['"](?P<import>[^'"]+)['"]"#,
    )
    .unwrap()
});

/// One reference occurrence inside css text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssLink<'a> {
    /// Reference as written, whitespace trimmed.
    pub url: &'a str,
    /// Byte range of `url` inside the scanned text.
    pub range: Range<usize>,
}

/// All external references in order of appearance (repeats included).
///
/// `data:` uris, empty `url()` and fragment-only references (`url(#clip)`)
/// point at nothing downloadable and are skipped.
pub fn find_links(content: &str) -> Vec<CssLink<'_>> {
    LINK.captures_iter(content)
        .filter_map(|caps| caps.name("url").or_else(|| caps.name("import")))
        .filter_map(|m| {
            let raw = m.as_str();
            let url = raw.trim();
            if url.is_empty() || url.starts_with('#') || is_data(url) {
                return None;
            }
            let start = m.start() + (raw.len() - raw.trim_start().len());
            Some(CssLink {
                url,
                range: start..start + url.len(),
            })
        })
        .collect()
}

/// Replace every reference for which `replace` returns a new value.
///
/// Only the reference text inside `url(..)` / `@import` is touched, so a name
/// that also occurs elsewhere in the stylesheet is left alone.
pub fn rewrite_links(content: &str, mut replace: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for link in find_links(content) {
        if let Some(new) = replace(link.url) {
            out.push_str(&content[last..link.range.start]);
            out.push_str(&new);
            last = link.range.end;
        }
    }
    out.push_str(&content[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_links() {
        let css = r#"
            @import "base.css";
            @import url('theme.css');
            .a { background: url( "img/a.png" ) }
            .b { background: url(img/b.png?v=1) }
            .c { background: url(data:image/png;base64,AAAA) }
            .d { filter: url(#blur) }
            @font-face { src: url('f.eot?#iefix') format('embedded-opentype'),
                              url(
                                f.woff2) }
        "#;
        let urls: Vec<_> = find_links(css).into_iter().map(|l| l.url).collect();
        assert_eq!(
            urls,
            vec!["base.css", "theme.css", "img/a.png", "img/b.png?v=1", "f.eot?#iefix", "f.woff2"]
        );
    }

    #[test]
    fn test_ranges_point_at_reference() {
        let css = ".a{background:url( 'x.png' )}";
        let link = &find_links(css)[0];
        assert_eq!(&css[link.range.clone()], "x.png");
    }

    #[test]
    fn test_rewrite_links_only_inside_references() {
        let css = "/* a.png */ .a{background:url(a.png)} .b{background:url('a.png')}";
        let out = rewrite_links(css, |url| (url == "a.png").then(|| "res/a.png?1".to_string()));
        assert_eq!(
            out,
            "/* a.png */ .a{background:url(res/a.png?1)} .b{background:url('res/a.png?1')}"
        );
    }

    #[test]
    fn test_rewrite_without_changes_is_identity() {
        let css = ".a{background:url(a.png)}";
        assert_eq!(rewrite_links(css, |_| None), css);
    }
}
