//! prodfront - production optimization for static html sites.
//!
//! Downloads cdn resources, minifies scripts, stylesheets and pages, adds
//! anti-cache hashes and integrity attributes, and writes gzip siblings.

mod cli;
mod config;
mod download;
mod error;
mod freshness;
mod html;
mod logger;
mod minify;
mod model;
mod pipeline;
mod report;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::FileConfig;
use pipeline::OptimizationFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use utils::size::plural_count;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let mut file_config = FileConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    file_config.apply_cli(&cli);
    let settings = file_config.into_settings(&settings_root(&cli)?)?;
    logger::set_verbose(settings.debug);

    let start = Instant::now();
    let mut flow = OptimizationFlow::new(settings);
    flow.run()?;

    let settings = flow.settings();
    print!(
        "{}",
        report::stats::render(flow.pages(), &settings.base_dir, settings.debug)
    );
    log!(
        "done";
        "{} optimized in {:.2}s",
        plural_count(flow.pages().len(), "page"),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Directory a relative site path is resolved against: the working
/// directory for `--dir`, the config file's directory otherwise.
fn settings_root(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    if cli.dir.is_some() || !cli.config.exists() {
        return Ok(cwd);
    }
    let parent = cli.config.parent().unwrap_or(Path::new(""));
    Ok(cwd.join(parent))
}
