//! Whole-document HTML minification with minify-html.

use super::HtmlMinifier;
use minify_html::{Cfg, minify};

/// Which embedded blocks get minified along with the markup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HtmlMinifyOptions {
    pub css: bool,
    pub js: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MinifyHtml;

impl HtmlMinifier for MinifyHtml {
    fn minify(&self, html: &str, options: HtmlMinifyOptions) -> Result<String, String> {
        let mut cfg = Cfg::new();
        cfg.keep_html_and_head_opening_tags = true;
        cfg.do_not_minify_doctype = true;
        cfg.ensure_spec_compliant_unquoted_attribute_values = true;
        cfg.keep_spaces_between_attributes = true;
        cfg.minify_css = options.css;
        cfg.minify_js = options.js;

        String::from_utf8(minify(html.as_bytes(), &cfg)).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Test</title>\n    <style>\n      body { color: red; }\n    </style>\n  </head>\n  <body>\n    <!-- comment -->\n    <p>Hello</p>\n  </body>\n</html>\n";

    #[test]
    fn test_minify_keeps_structure() {
        let out = MinifyHtml.minify(PAGE, HtmlMinifyOptions::default()).unwrap();
        assert!(out.len() < PAGE.len());
        assert!(out.to_ascii_lowercase().starts_with("<!doctype html>"));
        assert!(out.contains("<html>"));
        assert!(out.contains("<head>"));
        assert!(!out.contains("comment"));
        // embedded css untouched
        assert!(out.contains("body { color: red; }"));
    }

    #[test]
    fn test_minify_embedded_css() {
        let options = HtmlMinifyOptions { css: true, js: false };
        let out = MinifyHtml.minify(PAGE, options).unwrap();
        assert!(out.contains("body{color:red}"));
    }

    #[test]
    fn test_minify_is_stable() {
        let once = MinifyHtml.minify(PAGE, HtmlMinifyOptions::default()).unwrap();
        let twice = MinifyHtml.minify(&once, HtmlMinifyOptions::default()).unwrap();
        assert_eq!(once, twice);
    }
}
