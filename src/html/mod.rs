//! HTML parsing collaborator.
//!
//! The parser only locates resource tags and captures their literal opening
//! tag text. Pages are never re-serialized from a tree: rewriting is literal
//! substitution of that captured text, which keeps template markup (JSP,
//! Freemarker, ..) around the tags untouched.

mod tag;
mod tl;

pub use tag::TagElement;
pub use tl::TlParser;

/// A resource tag found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceElement {
    pub element: TagElement,
    /// Opening tag exactly as written in the page.
    pub source: String,
}

/// Resource tags in order of appearance.
#[derive(Debug, Default)]
pub struct ResourceTags {
    pub css: Vec<SourceElement>,
    pub js: Vec<SourceElement>,
}

pub trait HtmlParser {
    /// Find `<link rel="stylesheet" href>` and `<script src>` tags.
    fn parse(&self, content: &str) -> Result<ResourceTags, String>;
}

/// `rel` is a space separated token list.
fn is_stylesheet(element: &TagElement) -> bool {
    element.name() == "link"
        && element
            .attr("rel")
            .is_some_and(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("stylesheet")))
        && element.attr("href").is_some_and(|href| !href.trim().is_empty())
}

fn is_script(element: &TagElement) -> bool {
    element.name() == "script" && element.attr("src").is_some_and(|src| !src.trim().is_empty())
}
