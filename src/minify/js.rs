//! JavaScript minification with oxc.

use super::{CommentStyle, MinifyResult, ResourceMinifier, write_output};
use crate::error::{OptimizeError, Result};
use crate::utils::path::{file_name, read_text};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, CompressOptionsUnused, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct OxcJsMinifier;

struct Minified {
    code: String,
    map: Option<String>,
}

/// Minify as a classic script first; sources using `import`/`export` are
/// retried as modules.
fn minify_source(source: &str, name: &str, source_map: bool) -> std::result::Result<Minified, String> {
    match minify_as(source, name, source_map, SourceType::script()) {
        Ok(res) => Ok(res),
        Err(script_errors) => minify_as(source, name, source_map, SourceType::mjs())
            .map_err(|_| script_errors),
    }
}

fn minify_as(
    source: &str,
    name: &str,
    source_map: bool,
    source_type: SourceType,
) -> std::result::Result<Minified, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(messages.join("\n"));
    }

    let mut program = ret.program;
    let options = if source_type.is_script() {
        // top-level names of classic scripts are page globals
        MinifierOptions {
            mangle: Some(MangleOptions {
                top_level: Some(false),
                ..MangleOptions::default()
            }),
            compress: Some(CompressOptions {
                unused: CompressOptionsUnused::Keep,
                ..CompressOptions::smallest()
            }),
        }
    } else {
        MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        }
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let ret = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: source_map.then(|| PathBuf::from(name)),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    Ok(Minified {
        code: ret.code,
        map: ret.map.map(|m| m.to_json_string()),
    })
}

impl ResourceMinifier for OxcJsMinifier {
    fn minify(&self, file: &Path, source_map: bool) -> Result<MinifyResult> {
        let source = read_text(file)?;
        let minified = minify_source(&source, &file_name(file), source_map).map_err(|message| {
            OptimizeError::Minify {
                file: file.to_path_buf(),
                message,
            }
        })?;
        write_output(file, minified.code, minified.map, CommentStyle::Line, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_minify_keeps_globals() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(
            &file,
            "// greeting helper\nfunction greet(name) {\n    var message = 'Hello, ' + name;\n    return message;\n}\n",
        )
        .unwrap();

        let res = OxcJsMinifier.minify(&file, false).unwrap();
        assert_eq!(res.minified, dir.path().join("app.min.js"));
        assert!(res.source_map.is_none());

        let code = fs::read_to_string(&res.minified).unwrap();
        assert!(code.contains("function greet("));
        assert!(!code.contains("greeting helper"));
        assert!(code.len() < fs::read_to_string(&file).unwrap().len());
        // input is left for the caller
        assert!(file.exists());
    }

    #[test]
    fn test_unused_top_level_declarations_survive() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("counter.js");
        fs::write(
            &file,
            "var counter = 0;\nlet settings = { step: 1 };\nfunction increment() {\n    counter += settings.step;\n}\n",
        )
        .unwrap();

        let res = OxcJsMinifier.minify(&file, false).unwrap();
        let code = fs::read_to_string(&res.minified).unwrap();
        for name in ["counter", "settings", "increment"] {
            assert!(code.contains(name), "{name} missing from {code:?}");
        }
    }

    #[test]
    fn test_minify_module_syntax() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("main.js");
        fs::write(&file, "import { a } from './a.js';\nexport const b = a + 1;\n").unwrap();
        assert!(OxcJsMinifier.minify(&file, false).is_ok());
    }

    #[test]
    fn test_source_map_generated() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(&file, "function add(first, second) { return first + second; }\nadd(1, 2);\n").unwrap();

        let res = OxcJsMinifier.minify(&file, true).unwrap();
        let map = res.source_map.unwrap();
        assert_eq!(map, dir.path().join("app.min.js.map"));

        let code = fs::read_to_string(&res.minified).unwrap();
        assert!(code.ends_with("//# sourceMappingURL=app.min.js.map"));

        let json: Value = serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
        assert_eq!(json["version"], 3);
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.js");
        fs::write(&file, "function ( {").unwrap();
        assert!(matches!(
            OxcJsMinifier.minify(&file, false),
            Err(OptimizeError::Minify { .. })
        ));
        assert!(!dir.path().join("broken.min.js").exists());
    }
}
