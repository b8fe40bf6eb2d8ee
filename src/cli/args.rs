//! Command-line interface definitions.

use clap::{ColorChoice, Args, Parser};
use std::path::PathBuf;

/// Optimize a static web directory for production: download cdn resources,
/// minify, add integrity and anti-cache tokens, gzip.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Site directory (overrides `paths.source` from the config file)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: prodfront.toml, optional)
    #[arg(short = 'C', long, default_value = "prodfront.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print every recorded change
    #[arg(short = 'v', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub verbose: Option<bool>,

    #[command(flatten)]
    pub optimize: OptimizeArgs,
}

/// Per-phase switches. Unset flags keep the config file value.
#[derive(Args, Debug, Clone, Default)]
pub struct OptimizeArgs {
    /// Directory for downloaded scripts (relative to the site directory)
    #[arg(long)]
    pub js_dir: Option<String>,

    /// Directory for downloaded stylesheets (relative to the site directory)
    #[arg(long)]
    pub css_dir: Option<String>,

    /// Page extensions to process, comma separated
    #[arg(long, value_delimiter = ',')]
    pub html_ext: Option<Vec<String>>,

    /// Download cdn resources
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub download: Option<bool>,

    /// Try `.min.` variants of cdn resources first
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub prefer_min: Option<bool>,

    /// Download source maps of cdn resources
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub download_source_maps: Option<bool>,

    /// Minify js files
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_js: Option<bool>,

    /// Minify css files
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_css: Option<bool>,

    /// Minify html pages
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_html: Option<bool>,

    /// Minify inline `<script>` blocks of html pages
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_html_js: Option<bool>,

    /// Minify inline `<style>` blocks of html pages
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_html_css: Option<bool>,

    /// Write source maps for minified files
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub source_maps: Option<bool>,

    /// Append `?<md5>` to resource urls
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub anti_cache: Option<bool>,

    /// Add subresource integrity attributes
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub integrity: Option<bool>,

    /// Write `.gz` siblings
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub gzip: Option<bool>,

    /// Glob of local files to skip (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Glob of remote urls to keep remote (repeatable)
    #[arg(long)]
    pub ignore_download: Vec<String>,
}
