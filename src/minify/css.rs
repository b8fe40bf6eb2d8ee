//! CSS minification with lightningcss.

use super::{CommentStyle, MinifyResult, ResourceMinifier, write_output};
use crate::error::{OptimizeError, Result};
use crate::utils::path::{file_name, read_text};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use parcel_sourcemap::SourceMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default, Clone, Copy)]
pub struct LightningCssMinifier;

struct Minified {
    code: String,
    map: Option<String>,
    warnings: Vec<String>,
}

fn minify_source(source: &str, name: &str, want_map: bool) -> std::result::Result<Minified, String> {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions {
        filename: name.to_string(),
        warnings: Some(Arc::clone(&warnings)),
        ..ParserOptions::default()
    };
    let stylesheet = StyleSheet::parse(source, options).map_err(|e| e.to_string())?;

    let mut source_map = want_map.then(|| {
        let mut map = SourceMap::new("/");
        map.add_source(name);
        map
    });
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: source_map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map = source_map
        .as_mut()
        .map(|map| map.to_json(None).map_err(|e| format!("{e:?}")))
        .transpose()?;

    let warnings = warnings
        .read()
        .map(|list| list.iter().map(|w| w.to_string()).collect())
        .unwrap_or_default();

    Ok(Minified {
        code: result.code,
        map,
        warnings,
    })
}

impl ResourceMinifier for LightningCssMinifier {
    fn minify(&self, file: &Path, source_map: bool) -> Result<MinifyResult> {
        let source = read_text(file)?;
        let minified = minify_source(&source, &file_name(file), source_map).map_err(|message| {
            OptimizeError::Minify {
                file: file.to_path_buf(),
                message,
            }
        })?;
        let log = (!minified.warnings.is_empty()).then(|| minified.warnings.join("\n"));
        write_output(file, minified.code, minified.map, CommentStyle::Block, log)
    }
}
