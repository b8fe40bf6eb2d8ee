//! Source map inspection and `sourcesContent` embedding.
//!
//! Maps are edited as `serde_json::Value` so unknown fields and key order
//! survive the rewrite.

use crate::error::{OptimizeError, Result};
use crate::utils::path::{normalize, read_last_line, read_text, relative, write};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;

static SOURCE_MAPPING_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sourceMappingURL=([^ *]+)").unwrap());

/// `sourceMappingURL` value in a line of code.
pub fn reference(line: &str) -> Option<&str> {
    SOURCE_MAPPING_URL
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `sourceMappingURL` declared on the last non-blank line of a file.
pub fn file_reference(file: &Path) -> Result<Option<String>> {
    Ok(read_last_line(file)?.and_then(|line| reference(&line).map(str::to_string)))
}

fn error(file: &Path, message: impl Into<String>) -> OptimizeError {
    OptimizeError::SourceMap {
        file: file.to_path_buf(),
        message: message.into(),
    }
}

fn parse(map: &Path) -> Result<Value> {
    serde_json::from_str(&read_text(map)?).map_err(|e| error(map, e.to_string()))
}

fn has_sources_content(json: &Value) -> bool {
    json.get("sourcesContent")
        .and_then(Value::as_array)
        .is_some_and(|content| !content.is_empty())
}

fn sources(map: &Path, json: &Value) -> Result<Vec<String>> {
    json.get("sources")
        .and_then(Value::as_array)
        .ok_or_else(|| error(map, "no sources declared"))?
        .iter()
        .map(|s| {
            s.as_str()
                .map(str::to_string)
                .ok_or_else(|| error(map, "non-string source entry"))
        })
        .collect()
}

fn store(map: &Path, mut json: Value, sources: Option<Vec<String>>, content: Vec<String>) -> Result<()> {
    if let Some(obj) = json.as_object_mut() {
        if let Some(sources) = sources {
            obj.insert("sources".into(), sources.into());
        }
        obj.insert("sourcesContent".into(), content.into());
    }
    let text = serde_json::to_string(&json).map_err(|e| error(map, e.to_string()))?;
    write(map, text)
}

/// Embed local sources into the map.
///
/// Sources are resolved as absolute paths first, then relative to the map,
/// and rewritten relative to the map's directory. Returns the number of
/// embedded files, `0` when the map already carried its sources.
pub fn include_sources(map: &Path) -> Result<usize> {
    let json = parse(map)?;
    if has_sources_content(&json) {
        return Ok(0);
    }
    let base_dir = map.parent().unwrap_or(Path::new("."));

    let mut relative_sources = Vec::new();
    let mut content = Vec::new();
    for src in sources(map, &json)? {
        let mut source = Path::new(&src).to_path_buf();
        if !source.exists() {
            source = normalize(&base_dir.join(&src));
        }
        if !source.exists() {
            return Err(error(map, format!("source file not found: {}", source.display())));
        }
        relative_sources.push(relative(base_dir, &source));
        content.push(read_text(&source)?);
    }

    let count = content.len();
    store(map, json, Some(relative_sources), content)?;
    Ok(count)
}

/// Embed remote sources into a downloaded map.
///
/// Each source is fetched from `base_url` + `sourceRoot` + source.
pub fn include_remote_sources(
    map: &Path,
    base_url: &str,
    mut fetch: impl FnMut(&str) -> Result<String>,
) -> Result<usize> {
    let json = parse(map)?;
    if has_sources_content(&json) {
        return Ok(0);
    }
    let root = json.get("sourceRoot").and_then(Value::as_str).unwrap_or("");
    let base = format!("{base_url}{root}");

    let content = sources(map, &json)?
        .iter()
        .map(|src| fetch(&format!("{base}{src}")))
        .collect::<Result<Vec<_>>>()?;

    let count = content.len();
    store(map, json, None, content)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reference() {
        assert_eq!(reference("//# sourceMappingURL=lib.min.js.map"), Some("lib.min.js.map"));
        assert_eq!(reference("/*# sourceMappingURL=lib.css.map */"), Some("lib.css.map"));
        assert_eq!(reference("var a = 1;"), None);
    }

    #[test]
    fn test_include_sources_relative_to_map() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/app.js"), "var app = 1;").unwrap();
        let map = dir.path().join("app.min.js.map");
        fs::write(
            &map,
            r#"{"version":3,"sources":["src/app.js"],"names":[],"mappings":"AAAA"}"#,
        )
        .unwrap();

        assert_eq!(include_sources(&map).unwrap(), 1);
        let json: Value = serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
        assert_eq!(json["sources"][0], "src/app.js");
        assert_eq!(json["sourcesContent"][0], "var app = 1;");
        assert_eq!(json["mappings"], "AAAA");

        // already embedded
        assert_eq!(include_sources(&map).unwrap(), 0);
    }

    #[test]
    fn test_include_sources_missing_file() {
        let dir = TempDir::new().unwrap();
        let map = dir.path().join("a.map");
        fs::write(&map, r#"{"version":3,"sources":["gone.js"],"mappings":""}"#).unwrap();
        assert!(matches!(include_sources(&map), Err(OptimizeError::SourceMap { .. })));
    }

    #[test]
    fn test_include_remote_sources() {
        let dir = TempDir::new().unwrap();
        let map = dir.path().join("lib.min.js.map");
        fs::write(
            &map,
            r#"{"version":3,"sourceRoot":"src/","sources":["lib.js"],"mappings":"AAAA"}"#,
        )
        .unwrap();

        let mut requested = Vec::new();
        let count = include_remote_sources(&map, "https://cdn.example/dist/", |url| {
            requested.push(url.to_string());
            Ok("var lib;".to_string())
        })
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(requested, vec!["https://cdn.example/dist/src/lib.js"]);
        let json: Value = serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
        assert_eq!(json["sourcesContent"][0], "var lib;");
    }
}
