//! Minifier collaborators.
//!
//! - JavaScript: oxc (compress + mangle, no top-level renaming)
//! - CSS: lightningcss
//! - HTML: minify-html
//!
//! Resource minifiers write `<name>.min.<ext>` next to the input (plus an
//! optional `<name>.min.<ext>.map`) and leave the input in place. Removing the
//! original is up to the caller.

mod css;
mod html;
mod js;

pub use css::LightningCssMinifier;
pub use html::{HtmlMinifyOptions, MinifyHtml};
pub use js::OxcJsMinifier;

use crate::error::Result;
use crate::utils::path::{file_name, min_name, write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyResult {
    pub minified: PathBuf,
    pub source_map: Option<PathBuf>,
    /// Non-fatal diagnostics worth showing to the user.
    pub log: Option<String>,
}

pub trait ResourceMinifier {
    fn minify(&self, file: &Path, source_map: bool) -> Result<MinifyResult>;
}

pub trait HtmlMinifier {
    fn minify(&self, html: &str, options: HtmlMinifyOptions) -> std::result::Result<String, String>;
}

/// One minifier per content type.
pub struct Minifiers {
    pub js: Box<dyn ResourceMinifier>,
    pub css: Box<dyn ResourceMinifier>,
    pub html: Box<dyn HtmlMinifier>,
}

impl Default for Minifiers {
    fn default() -> Self {
        Self {
            js: Box::new(OxcJsMinifier),
            css: Box::new(LightningCssMinifier),
            html: Box::new(MinifyHtml),
        }
    }
}

/// `css/lib.css` -> `css/lib.min.css`
pub fn min_path(file: &Path) -> PathBuf {
    file.with_file_name(min_name(&file_name(file)))
}

/// `css/lib.min.css` -> `css/lib.min.css.map`
pub fn map_path(minified: &Path) -> PathBuf {
    minified.with_file_name(format!("{}.map", file_name(minified)))
}

enum CommentStyle {
    Line,
    Block,
}

/// Write minified code (with a trailing `sourceMappingURL` when a map exists)
/// and the map itself.
fn write_output(
    file: &Path,
    code: String,
    map: Option<String>,
    style: CommentStyle,
    log: Option<String>,
) -> Result<MinifyResult> {
    let minified = min_path(file);
    let mut code = code;

    let source_map = match map {
        Some(map) => {
            let map_file = map_path(&minified);
            let reference = file_name(&map_file);
            if !code.ends_with('\n') {
                code.push('\n');
            }
            code.push_str(&match style {
                CommentStyle::Line => format!("//# sourceMappingURL={reference}"),
                CommentStyle::Block => format!("/*# sourceMappingURL={reference} */"),
            });
            write(&map_file, map)?;
            Some(map_file)
        }
        None => None,
    };

    write(&minified, code)?;
    Ok(MinifyResult {
        minified,
        source_map,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_and_map_paths() {
        let file = Path::new("/site/js/app.js");
        let min = min_path(file);
        assert_eq!(min, PathBuf::from("/site/js/app.min.js"));
        assert_eq!(map_path(&min), PathBuf::from("/site/js/app.min.js.map"));
    }
}
