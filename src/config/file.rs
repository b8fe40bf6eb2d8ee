//! `prodfront.toml` configuration file.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "build/webapp"     # Site directory
//! js = "js"                   # Download directory for cdn scripts
//! css = "css"                 # Download directory for cdn stylesheets
//! html_extensions = ["html", "htm", "jsp"]
//! ignore = ["vendor/**"]      # Local files to skip
//!
//! [download]
//! enable = true               # Download cdn resources
//! prefer_min = true           # Try `.min.` variants first
//! source_maps = true          # Download remote source maps
//! ignore = ["*://fonts.googleapis.com/*"]
//!
//! [minify]
//! js = true
//! css = true
//! html = true
//! html_js = true              # Inline <script> blocks
//! html_css = true             # Inline <style> blocks
//! source_maps = true          # Write maps for minified files
//!
//! [output]
//! anti_cache = true           # `?<md5>` suffix on resource urls
//! integrity = true            # `integrity="sha384-.."` attributes
//! gzip = true                 # `.gz` siblings
//! debug = false               # Print every recorded change
//! ```

use super::{ConfigError, IgnoreGlobs, Settings};
use crate::cli::{Cli, OptimizeArgs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub minify: MinifyConfig,
    pub output: OutputConfig,
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Site directory, relative to the config file.
    pub source: PathBuf,
    pub js: String,
    pub css: String,
    pub html_extensions: Vec<String>,
    pub ignore: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            js: "js".into(),
            css: "css".into(),
            html_extensions: vec!["html".into(), "htm".into()],
            ignore: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub enable: bool,
    pub prefer_min: bool,
    pub source_maps: bool,
    pub ignore: Vec<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            enable: true,
            prefer_min: true,
            source_maps: true,
            ignore: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyConfig {
    pub js: bool,
    pub css: bool,
    pub html: bool,
    pub html_js: bool,
    pub html_css: bool,
    pub source_maps: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            js: true,
            css: true,
            html: true,
            html_js: true,
            html_css: true,
            source_maps: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub anti_cache: bool,
    pub integrity: bool,
    pub gzip: bool,
    pub debug: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            anti_cache: true,
            integrity: true,
            gzip: true,
            debug: false,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl FileConfig {
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Overlay command line values. Unset flags keep file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.dir {
            self.paths.source = dir.clone();
        }
        if let Some(verbose) = cli.verbose {
            self.output.debug = verbose;
        }

        let OptimizeArgs {
            js_dir,
            css_dir,
            html_ext,
            download,
            prefer_min,
            download_source_maps,
            minify_js,
            minify_css,
            minify_html,
            minify_html_js,
            minify_html_css,
            source_maps,
            anti_cache,
            integrity,
            gzip,
            ignore,
            ignore_download,
        } = &cli.optimize;

        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut self.paths.js, js_dir);
        set(&mut self.paths.css, css_dir);
        set(&mut self.paths.html_extensions, html_ext);
        set(&mut self.download.enable, download);
        set(&mut self.download.prefer_min, prefer_min);
        set(&mut self.download.source_maps, download_source_maps);
        set(&mut self.minify.js, minify_js);
        set(&mut self.minify.css, minify_css);
        set(&mut self.minify.html, minify_html);
        set(&mut self.minify.html_js, minify_html_js);
        set(&mut self.minify.html_css, minify_html_css);
        set(&mut self.minify.source_maps, source_maps);
        set(&mut self.output.anti_cache, anti_cache);
        set(&mut self.output.integrity, integrity);
        set(&mut self.output.gzip, gzip);

        self.paths.ignore.extend(ignore.iter().cloned());
        self.download.ignore.extend(ignore_download.iter().cloned());
    }

    /// Build validated settings. `root` anchors a relative `paths.source`.
    pub fn into_settings(self, root: &Path) -> Result<Settings, ConfigError> {
        let base_dir = if self.paths.source.is_absolute() {
            self.paths.source.clone()
        } else {
            root.join(&self.paths.source)
        };

        let settings = Settings {
            js_dir: self.paths.js,
            css_dir: self.paths.css,
            html_extensions: self.paths.html_extensions,
            download_resources: self.download.enable,
            prefer_min_download: self.download.prefer_min,
            download_source_maps: self.download.source_maps,
            minify_js: self.minify.js,
            minify_css: self.minify.css,
            minify_html: self.minify.html,
            minify_html_js: self.minify.html_js,
            minify_html_css: self.minify.html_css,
            generate_source_maps: self.minify.source_maps,
            apply_anti_cache: self.output.anti_cache,
            apply_integrity: self.output.integrity,
            gzip: self.output.gzip,
            debug: self.output.debug,
            ignore: IgnoreGlobs::new(&self.paths.ignore)?,
            ignore_download: IgnoreGlobs::new(&self.download.ignore)?,
            ..Settings::new(base_dir)
        };
        settings.validate()?;
        Ok(settings)
    }
}
