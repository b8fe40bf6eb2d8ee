//! Optimization flow over every html page of a directory.
//!
//! Phases run in a fixed order, each one for all pages before the next:
//!
//! ```text
//! Find -> Resolve -> MinifyJs -> MinifyCss -> ApplyIntegrity
//!      -> ApplyAntiCache -> UpdateHtml -> Gzip
//! ```
//!
//! Minification must see resolved files, hashes must see minified bytes,
//! links must carry hashes before pages are written and gzip must be last.


use crate::config::Settings;
use crate::download::{Downloader, HttpTransport, ResourceLoader};
use crate::html::{HtmlParser, TlParser};
use crate::minify::Minifiers;
use crate::model::{Env, HtmlPage};
use crate::report::{ConsoleObserver, Observer, debug::build_report};
use anyhow::{Context, Result};
use jwalk::WalkDir;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Find,
    Resolve,
    MinifyJs,
    MinifyCss,
    ApplyIntegrity,
    ApplyAntiCache,
    UpdateHtml,
    Gzip,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Find,
        Phase::Resolve,
        Phase::MinifyJs,
        Phase::MinifyCss,
        Phase::ApplyIntegrity,
        Phase::ApplyAntiCache,
        Phase::UpdateHtml,
        Phase::Gzip,
    ];

    pub fn is_enabled(self, settings: &Settings) -> bool {
        match self {
            Phase::Find | Phase::Resolve | Phase::UpdateHtml => true,
            Phase::MinifyJs => settings.minify_js,
            Phase::MinifyCss => settings.minify_css,
            Phase::ApplyIntegrity => settings.apply_integrity,
            Phase::ApplyAntiCache => settings.apply_anti_cache,
            Phase::Gzip => settings.gzip,
        }
    }

    /// Phases followed by a resource report in debug mode.
    fn reports(self) -> bool {
        matches!(self, Phase::Find | Phase::Resolve | Phase::ApplyAntiCache)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Find => "find resources",
            Phase::Resolve => "resolve resources",
            Phase::MinifyJs => "minify js",
            Phase::MinifyCss => "minify css",
            Phase::ApplyIntegrity => "apply integrity",
            Phase::ApplyAntiCache => "apply anti-cache",
            Phase::UpdateHtml => "update html",
            Phase::Gzip => "gzip",
        })
    }
}

pub struct OptimizationFlow {
    settings: Settings,
    downloader: Box<dyn Downloader>,
    parser: Box<dyn HtmlParser>,
    minifiers: Minifiers,
    observer: Box<dyn Observer>,
    pages: Vec<HtmlPage>,
}

impl OptimizationFlow {
    /// Flow with the http downloader, `tl` parser, default minifiers and
    /// console output.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            downloader: Box::new(ResourceLoader::new(HttpTransport::new())),
            parser: Box::new(TlParser),
            minifiers: Minifiers::default(),
            observer: Box::new(ConsoleObserver),
            pages: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_downloader(mut self, downloader: impl Downloader + 'static) -> Self {
        self.downloader = Box::new(downloader);
        self
    }

    #[cfg(test)]
    pub fn with_parser(mut self, parser: impl HtmlParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    #[cfg(test)]
    pub fn with_minifiers(mut self, minifiers: Minifiers) -> Self {
        self.minifiers = minifiers;
        self
    }

    #[cfg(test)]
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Pages of the last run, in discovery order.
    pub fn pages(&self) -> &[HtmlPage] {
        &self.pages
    }

    /// Html files under the base directory, sorted by path.
    fn find_files(&self) -> Vec<PathBuf> {
        let settings = &self.settings;
        let mut files: Vec<PathBuf> = WalkDir::new(&settings.base_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| settings.is_html(path) && !settings.is_ignored(path))
            .collect();
        files.sort();
        files
    }

    /// Run every enabled phase. Fatal errors abort the whole run.
    pub fn run(&mut self) -> Result<()> {
        let files = self.find_files();
        let Self {
            settings,
            downloader,
            parser,
            minifiers,
            observer,
            pages,
        } = self;
        let settings = &*settings;
        let env = Env {
            settings,
            downloader: downloader.as_ref(),
            parser: parser.as_ref(),
            minifiers: &*minifiers,
            observer: observer.as_ref(),
        };

        pages.clear();
        for phase in Phase::ALL {
            if !phase.is_enabled(settings) {
                continue;
            }
            env.observer.on_phase_start(phase);

            if phase == Phase::Find {
                for file in &files {
                    let mut page = HtmlPage::new(file, &settings.base_dir);
                    page.find_resources(&env)
                        .with_context(|| format!("failed to parse {}", file.display()))?;
                    pages.push(page);
                }
            } else {
                for page in pages.iter_mut() {
                    run_phase(phase, page, &env)
                        .with_context(|| format!("{phase} failed for {}", page.file().display()))?;
                }
            }

            if settings.debug && phase.reports() {
                for page in pages.iter() {
                    env.info("debug", format!("{phase}: {}", build_report(page, &settings.base_dir)));
                }
            }
        }
        Ok(())
    }
}

fn run_phase(phase: Phase, page: &mut HtmlPage, env: &Env) -> crate::error::Result<()> {
    match phase {
        Phase::Find => Ok(()),
        Phase::Resolve => page.resolve_resources(env),
        Phase::MinifyJs => page.minify_js(env),
        Phase::MinifyCss => page.minify_css(env),
        Phase::ApplyIntegrity => page.apply_integrity(env),
        Phase::ApplyAntiCache => page.apply_anti_cache(env),
        Phase::UpdateHtml => page.update_html(env),
        Phase::Gzip => page.gzip(env),
    }
}
