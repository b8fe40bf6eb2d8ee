//! Intermediate resource report, printed between phases in debug mode.

use crate::model::{HtmlPage, Optimized};
use crate::utils::path::relative;
use std::fmt::Write;
use std::path::Path;

/// Page path followed by every detected resource and its current target.
///
/// ```text
/// index.html
///     js/app.js
///     https://cdn.example/lib.css (download fail)
///         ../img/a.png
/// ```
pub fn build_report(page: &HtmlPage, base_dir: &Path) -> String {
    let mut out = relative(base_dir, page.file());
    out.push('\n');
    for js in page.js() {
        line(&mut out, 1, js.target(), js);
    }
    for css in page.css() {
        line(&mut out, 1, css.target(), css);
        for sub in css.sub_resources() {
            line(&mut out, 2, sub.target(), sub);
        }
    }
    out
}

fn line(out: &mut String, depth: usize, target: &str, item: &impl Optimized) {
    let _ = write!(out, "{}{}", "    ".repeat(depth), target);
    if let Some(reason) = item.entity().ignore_reason() {
        let _ = write!(out, " ({reason})");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::download::{ResourceLoader, memory::MemoryTransport};
    use crate::html::TlParser;
    use crate::minify::Minifiers;
    use crate::model::Env;
    use crate::report::RecordingObserver;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_report_marks_ignored_resources() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/app.js"), "var a = 1;").unwrap();
        fs::write(
            dir.path().join("index.html"),
            r#"<html><head><script src="js/app.js"></script><script src="missing.js"></script></head></html>"#,
        )
        .unwrap();

        let settings = Settings::new(dir.path());
        let downloader = ResourceLoader::new(MemoryTransport::default());
        let minifiers = Minifiers::default();
        let observer = RecordingObserver::default();
        let env = Env {
            settings: &settings,
            downloader: &downloader,
            parser: &TlParser,
            minifiers: &minifiers,
            observer: &observer,
        };

        let mut page = HtmlPage::new(&dir.path().join("index.html"), dir.path());
        page.find_resources(&env).unwrap();
        page.resolve_resources(&env).unwrap();

        let report = build_report(&page, dir.path());
        assert_eq!(report, "index.html\n    js/app.js\n    missing.js (not found)\n");
    }
}
