//! Run configuration.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error.rs   # ConfigError
//! ├── file.rs    # prodfront.toml sections + CLI overlay
//! └── mod.rs     # Settings (this file)
//! ```
//!
//! [`Settings`] is built once per run and only borrowed afterwards.

mod error;
mod file;

pub use error::ConfigError;
pub use file::FileConfig;

use crate::utils::path::normalize;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

// ============================================================================
// Ignore globs
// ============================================================================

/// Compiled glob list. The default matches nothing.
#[derive(Debug, Clone)]
pub struct IgnoreGlobs {
    set: GlobSet,
}

impl Default for IgnoreGlobs {
    fn default() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }
}

impl IgnoreGlobs {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::Glob(pattern.clone(), e))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| ConfigError::Glob(patterns.join(", "), e))?;
        Ok(Self { set })
    }

    pub fn is_match(&self, candidate: impl AsRef<Path>) -> bool {
        !self.set.is_empty() && self.set.is_match(candidate)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Everything a run needs to know.
///
/// [`Settings::new`] applies path defaults and leaves every phase disabled;
/// callers switch on what they need before starting the run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Site root. All pages below it are processed.
    pub base_dir: PathBuf,
    /// Download directory for cdn scripts, relative to `base_dir`.
    pub js_dir: String,
    /// Download directory for cdn stylesheets, relative to `base_dir`.
    pub css_dir: String,
    /// Page extensions (without dot, case-insensitive).
    pub html_extensions: Vec<String>,

    pub download_resources: bool,
    pub prefer_min_download: bool,
    pub download_source_maps: bool,

    pub minify_js: bool,
    pub minify_css: bool,
    pub minify_html: bool,
    pub minify_html_js: bool,
    pub minify_html_css: bool,
    pub generate_source_maps: bool,

    pub apply_anti_cache: bool,
    pub apply_integrity: bool,
    pub gzip: bool,

    /// Verbose change reports.
    pub debug: bool,

    /// Local files (pages and resources) to leave alone, relative to `base_dir`.
    pub ignore: IgnoreGlobs,
    /// Remote urls that must not be downloaded.
    pub ignore_download: IgnoreGlobs,
}

impl Settings {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: normalize(base_dir.as_ref()),
            js_dir: "js".into(),
            css_dir: "css".into(),
            html_extensions: vec!["html".into(), "htm".into()],
            download_resources: false,
            prefer_min_download: false,
            download_source_maps: false,
            minify_js: false,
            minify_css: false,
            minify_html: false,
            minify_html_js: false,
            minify_html_css: false,
            generate_source_maps: false,
            apply_anti_cache: false,
            apply_integrity: false,
            gzip: false,
            debug: false,
            ignore: IgnoreGlobs::default(),
            ignore_download: IgnoreGlobs::default(),
        }
    }

    /// Settings with every phase enabled (debug stays off).
    #[cfg(test)]
    pub fn all_enabled(base_dir: impl AsRef<Path>) -> Self {
        Self {
            download_resources: true,
            prefer_min_download: true,
            download_source_maps: true,
            minify_js: true,
            minify_css: true,
            minify_html: true,
            minify_html_js: true,
            minify_html_css: true,
            generate_source_maps: true,
            apply_anti_cache: true,
            apply_integrity: true,
            gzip: true,
            ..Self::new(base_dir)
        }
    }

    pub fn js_target_dir(&self) -> PathBuf {
        self.base_dir.join(&self.js_dir)
    }

    pub fn css_target_dir(&self) -> PathBuf {
        self.base_dir.join(&self.css_dir)
    }

    pub fn is_html(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.html_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    /// Local file matched by an ignore glob (checked relative to `base_dir`).
    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
        self.ignore.is_match(relative)
    }

    pub fn is_download_ignored(&self, url: &str) -> bool {
        self.ignore_download.is_match(url)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_dir.exists() {
            return Err(ConfigError::Validation(format!(
                "directory `{}` does not exist",
                self.base_dir.display()
            )));
        }
        if !self.base_dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "`{}` is not a directory",
                self.base_dir.display()
            )));
        }
        if self.html_extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "at least one html extension is required".into(),
            ));
        }
        for (name, dir) in [("js_dir", &self.js_dir), ("css_dir", &self.css_dir)] {
            if Path::new(dir).is_absolute() {
                return Err(ConfigError::Validation(format!(
                    "{name} must be relative to the site directory, got `{dir}`"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_disables_every_phase() {
        let settings = Settings::new("/site");
        assert!(!settings.download_resources);
        assert!(!settings.minify_js);
        assert!(!settings.gzip);
        assert_eq!(settings.js_target_dir(), PathBuf::from("/site/js"));
        assert_eq!(settings.css_target_dir(), PathBuf::from("/site/css"));
    }

    #[test]
    fn test_is_html() {
        let settings = Settings::new("/site");
        assert!(settings.is_html(Path::new("/site/index.html")));
        assert!(settings.is_html(Path::new("/site/old.HTM")));
        assert!(!settings.is_html(Path::new("/site/page.jsp")));
        assert!(!settings.is_html(Path::new("/site/Makefile")));
    }

    #[test]
    fn test_ignore_globs_relative_to_base() {
        let mut settings = Settings::new("/site");
        settings.ignore = IgnoreGlobs::new(&["vendor/**".into(), "*.tmp.html".into()]).unwrap();
        settings.ignore_download = IgnoreGlobs::new(&["*://fonts.googleapis.com/*".into()]).unwrap();

        assert!(settings.is_ignored(Path::new("/site/vendor/lib.js")));
        assert!(settings.is_ignored(Path::new("/site/draft.tmp.html")));
        assert!(!settings.is_ignored(Path::new("/site/js/app.js")));
        assert!(settings.is_download_ignored("https://fonts.googleapis.com/css?family=Roboto"));
        assert!(!settings.is_download_ignored("https://cdn.example/lib.js"));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            IgnoreGlobs::new(&["a[".into()]),
            Err(ConfigError::Glob(..))
        ));
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::new(dir.path()).validate().is_ok());
        assert!(Settings::new(dir.path().join("missing")).validate().is_err());

        let mut settings = Settings::new(dir.path());
        settings.html_extensions.clear();
        assert!(settings.validate().is_err());
    }
}
