//! End-of-run size table.
//!
//! ```text
//!                                   original       minified       gzipped
//! -----------------------------------------------------------------------
//! index.html                        3 KB           2 KB           850 bytes
//!   js/app.min.js                   12 KB          5 KB           2 KB
//!   css/lib.min.css                 40 KB          31 KB          6 KB
//!     resources/a.png               4 KB                          3 KB
//!                                   ---------------------------------------
//!                                   55 KB          38 KB          9 KB
//! ```

use crate::model::{HtmlPage, Optimized, SizeType};
use crate::utils::path::{file_name, relative};
use crate::utils::size::display_size;
use crate::utils::url::clear_params;
use std::fmt::Write;
use std::path::Path;

const NAME_WIDTH: usize = 70;
const SIZE_WIDTH: usize = 15;

/// Render the table. With `debug`, each entity's change log follows its row.
pub fn render(pages: &[HtmlPage], base_dir: &Path, debug: bool) -> String {
    let mut out = String::from("\n");
    if pages.is_empty() {
        return out;
    }

    let _ = writeln!(
        out,
        "{:NAME_WIDTH$} {:SIZE_WIDTH$}{:SIZE_WIDTH$}{:SIZE_WIDTH$}",
        "", "original", "minified", "gzipped"
    );
    out.push_str(&"-".repeat(NAME_WIDTH + SIZE_WIDTH * 3 + 1));
    out.push('\n');

    for page in pages {
        row(&mut out, &relative(base_dir, page.file()), page, debug, "");
        for js in page.js() {
            row(&mut out, &format!("  {}", clear_params(js.target())), js, debug, "  ");
        }
        for css in page.css() {
            row(&mut out, &format!("  {}", clear_params(css.target())), css, debug, "  ");
            for sub in css.sub_resources() {
                row(&mut out, &format!("    {}", clear_params(sub.target())), sub, debug, "    ");
            }
        }

        if page.resources().next().is_some() {
            let _ = writeln!(out, "{:NAME_WIDTH$} {}", "", "-".repeat(SIZE_WIDTH * 3));
            let _ = write!(out, "{:NAME_WIDTH$} ", "");
            for size_type in SizeType::ALL {
                let _ = write!(out, "{:SIZE_WIDTH$}", display_size(total(page, size_type)));
            }
            out.push('\n');
        }
    }
    out
}

fn row(out: &mut String, name: &str, item: &impl Optimized, debug: bool, indent: &str) {
    let _ = write!(out, "{name:NAME_WIDTH$} ");
    match item.entity().ignore_reason() {
        Some(reason) => out.push_str(reason),
        None => {
            for size_type in SizeType::ALL {
                let size = item.entity().size(size_type).map(display_size).unwrap_or_default();
                let _ = write!(out, "{size:SIZE_WIDTH$}");
            }
        }
    }
    out.push('\n');

    if !debug {
        return;
    }
    let side_files = item.side_files();
    if !item.has_changes() && side_files.is_empty() {
        return;
    }
    if item.has_changes() {
        let _ = writeln!(out, "{indent}| changes:");
        for change in item.entity().changes() {
            let _ = writeln!(out, "{indent}|     {change}");
        }
    }
    for file in side_files {
        let _ = writeln!(out, "{indent}| wrote {}", file_name(file));
    }
    out.push('\n');
}

/// Page plus every resource that has a size, missing points falling back to
/// the previous measurement.
fn total(page: &HtmlPage, size_type: SizeType) -> u64 {
    let page_size = page.entity().effective_size(size_type).unwrap_or(0);
    let resources: u64 = page
        .resources()
        .filter(|res| res.entity().size(SizeType::Original).is_some())
        .filter_map(|res| res.entity().effective_size(size_type))
        .sum();
    page_size + resources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run() {
        assert_eq!(render(&[], Path::new("/site"), false), "\n");
    }

    #[test]
    fn test_page_without_resources() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<html></html>").unwrap();
        let page = HtmlPage::new(&file, dir.path());

        let table = render(&[page], dir.path(), true);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[1].contains("original"));
        assert!(lines[3].starts_with("index.html"));
        assert!(lines[3].contains("13 bytes"));
        // no totals for a page alone
        assert_eq!(lines.len(), 4);
    }
}
