//! File system helpers shared by every phase.
//!
//! Path handling is lexical (no `canonicalize`): resources may point at files
//! that do not exist yet, and relative links written back into pages must
//! not depend on symlink layout.

use crate::error::{OptimizeError, Result};
use crate::utils::digest::file_md5;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `file` relative to directory `from_dir`, always with `/` separators.
pub fn relative(from_dir: &Path, file: &Path) -> String {
    let from = normalize(from_dir);
    let file = normalize(file);
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = file.components().collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Insert `append` before the extension: `lib.js` + `.min` -> `lib.min.js`.
///
/// Names without an extension get the suffix at the end.
pub fn append_before_extension(name: &str, append: &str) -> String {
    match name.rfind('.') {
        Some(i) if i > 0 => format!("{}{append}{}", &name[..i], &name[i..]),
        _ => format!("{name}{append}"),
    }
}

/// Conventional minified name. Already minified names are kept.
pub fn min_name(name: &str) -> String {
    if is_minified_name(name) {
        name.to_string()
    } else {
        append_before_extension(name, ".min")
    }
}

pub fn is_minified_name(name: &str) -> bool {
    name.to_ascii_lowercase().contains(".min.")
}

/// First of `name`, `name.1.ext`, `name.2.ext`, .. that does not exist in `dir`.
///
/// The counter goes before the extension so `.min.` markers survive.
pub fn select_not_existing(dir: &Path, name: &str) -> PathBuf {
    let mut target = dir.join(name);
    let mut attempt = 0;
    while target.exists() {
        attempt += 1;
        target = dir.join(append_before_extension(name, &format!(".{attempt}")));
    }
    target
}

/// Whether two differently named files have identical content (size + md5).
pub fn is_duplicate(file: &Path, existing: &Path) -> Result<bool> {
    if file.file_name() == existing.file_name() || file_size(file) != file_size(existing) {
        return Ok(false);
    }
    Ok(file_md5(file)? == file_md5(existing)?)
}

pub fn file_size(path: &Path) -> u64 {
    path.metadata().map(|m| m.len()).unwrap_or(0)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read a text file with `\r\n` line endings normalized to `\n`.
pub fn read_text(path: &Path) -> Result<String> {
    let content =
        fs::read_to_string(path).map_err(|e| OptimizeError::Read(path.to_path_buf(), e))?;
    Ok(if content.contains("\r\n") {
        content.replace("\r\n", "\n")
    } else {
        content
    })
}

/// Write a file, creating missing parent directories.
pub fn write(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| OptimizeError::Write(parent.to_path_buf(), e))?;
    }
    fs::write(path, content).map_err(|e| OptimizeError::Write(path.to_path_buf(), e))
}

pub fn remove(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| OptimizeError::Write(path.to_path_buf(), e))
}

/// Last non-blank line, trimmed.
pub fn read_last_line(path: &Path) -> Result<Option<String>> {
    let file = fs::File::open(path).map_err(|e| OptimizeError::Read(path.to_path_buf(), e))?;
    let mut last = None;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| OptimizeError::Read(path.to_path_buf(), e))?;
        let line = line.trim();
        if !line.is_empty() {
            last = Some(line.to_string());
        }
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/site/css/../img/./a.png")),
            PathBuf::from("/site/img/a.png")
        );
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative(Path::new("/site"), Path::new("/site/css/lib.css")), "css/lib.css");
        assert_eq!(
            relative(Path::new("/site/pages"), Path::new("/site/css/lib.css")),
            "../css/lib.css"
        );
        assert_eq!(
            relative(Path::new("/site/css"), Path::new("/site/css/resources/a.png")),
            "resources/a.png"
        );
    }

    #[test]
    fn test_min_name() {
        assert_eq!(min_name("lib.js"), "lib.min.js");
        assert_eq!(min_name("lib.min.css"), "lib.min.css");
        assert_eq!(min_name("jquery.3.6.js"), "jquery.3.6.min.js");
        assert_eq!(min_name("LICENSE"), "LICENSE.min");
    }

    #[test]
    fn test_select_not_existing_preserves_min_marker() {
        let dir = TempDir::new().unwrap();
        assert_eq!(select_not_existing(dir.path(), "lib.min.js"), dir.path().join("lib.min.js"));

        fs::write(dir.path().join("lib.min.js"), "a").unwrap();
        fs::write(dir.path().join("lib.min.1.js"), "b").unwrap();
        assert_eq!(
            select_not_existing(dir.path(), "lib.min.js"),
            dir.path().join("lib.min.2.js")
        );
    }

    #[test]
    fn test_is_duplicate() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.css");
        let b = dir.path().join("b.css");
        let c = dir.path().join("c.css");
        fs::write(&a, "body{}").unwrap();
        fs::write(&b, "body{}").unwrap();
        fs::write(&c, "html{}").unwrap();

        assert!(is_duplicate(&a, &b).unwrap());
        assert!(!is_duplicate(&a, &c).unwrap());
        assert!(!is_duplicate(&a, &a).unwrap());
    }

    #[test]
    fn test_read_text_normalizes_line_endings() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("page.html");
        fs::write(&file, "<p>\r\n</p>\r\n").unwrap();
        assert_eq!(read_text(&file).unwrap(), "<p>\n</p>\n");
    }

    #[test]
    fn test_read_last_line_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("lib.js");
        fs::write(&file, "var a;\n//# sourceMappingURL=lib.js.map\n\n  \n").unwrap();
        assert_eq!(
            read_last_line(&file).unwrap().as_deref(),
            Some("//# sourceMappingURL=lib.js.map")
        );
    }
}
