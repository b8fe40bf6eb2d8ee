//! One processed HTML (or template) file and the resources it references.

use super::{Entity, Env, Optimized, ResourceKind, RootResource, SizeType};
use crate::error::{OptimizeError, Result};
use crate::minify::HtmlMinifyOptions;
use crate::utils::gzip::gzip;
use crate::utils::path::{file_size, read_text, relative, write};
use crate::utils::size::change_percent;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct HtmlPage {
    entity: Entity,
    file: PathBuf,
    base_dir: PathBuf,
    /// Only `.html` / `.htm` files are minified as a whole.
    pure_html: bool,
    gzip: Option<PathBuf>,
    js: Vec<RootResource>,
    css: Vec<RootResource>,
}

impl HtmlPage {
    pub fn new(file: &Path, base_dir: &Path) -> Self {
        let mut entity = Entity::default();
        entity.record_size(SizeType::Original, file_size(file));
        let pure_html = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

        Self {
            entity,
            file: file.to_path_buf(),
            base_dir: base_dir.to_path_buf(),
            pure_html,
            gzip: None,
            js: Vec::new(),
            css: Vec::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_pure_html(&self) -> bool {
        self.pure_html
    }

    pub fn gzip_file(&self) -> Option<&Path> {
        self.gzip.as_deref()
    }

    pub fn js(&self) -> &[RootResource] {
        &self.js
    }

    pub fn css(&self) -> &[RootResource] {
        &self.css
    }

    /// Stylesheets first, then scripts.
    pub fn resources(&self) -> impl Iterator<Item = &RootResource> {
        self.css.iter().chain(self.js.iter())
    }

    fn resources_mut(&mut self) -> impl Iterator<Item = &mut RootResource> {
        self.css.iter_mut().chain(self.js.iter_mut())
    }

    /// The page or any of its resources changed.
    pub fn is_changed(&self) -> bool {
        self.entity.has_changes() || self.resources().any(|res| res.has_changes())
    }

    // ========================================================================
    // Phases
    // ========================================================================

    pub fn find_resources(&mut self, env: &Env) -> Result<()> {
        let content = read_text(&self.file)?;
        let tags = env.parser.parse(&content).map_err(|message| OptimizeError::Parse {
            file: self.file.clone(),
            message,
        })?;

        let (file, base) = (&self.file, &self.base_dir);
        self.css = tags
            .css
            .into_iter()
            .map(|tag| RootResource::new(ResourceKind::Css, tag, file, base))
            .collect();
        self.js = tags
            .js
            .into_iter()
            .map(|tag| RootResource::new(ResourceKind::Js, tag, file, base))
            .collect();
        Ok(())
    }

    pub fn resolve_resources(&mut self, env: &Env) -> Result<()> {
        self.resources_mut().try_for_each(|res| res.resolve(env))
    }

    pub fn minify_js(&mut self, env: &Env) -> Result<()> {
        self.js.iter_mut().try_for_each(|res| res.minify(env))
    }

    pub fn minify_css(&mut self, env: &Env) -> Result<()> {
        self.css.iter_mut().try_for_each(|res| res.minify(env))
    }

    pub fn apply_integrity(&mut self, env: &Env) -> Result<()> {
        self.resources_mut().try_for_each(|res| res.apply_integrity(env))
    }

    pub fn apply_anti_cache(&mut self, env: &Env) -> Result<()> {
        self.resources_mut().try_for_each(|res| res.apply_anti_cache(env))
    }

    /// Substitute changed tags literally, then minify the page if enabled.
    pub fn update_html(&mut self, env: &Env) -> Result<()> {
        let mut content = read_text(&self.file)?;

        if self.is_changed() {
            let mut replaced = FxHashSet::default();
            let mut warnings = Vec::new();
            for res in self.css.iter().chain(self.js.iter()) {
                if !res.is_tag_changed() {
                    continue;
                }
                let source = res.source_declaration();
                if replaced.contains(source) {
                    continue;
                }
                if content.contains(source) {
                    content = content.replace(source, &res.element().start_tag());
                    replaced.insert(source);
                } else {
                    warnings.push(format!(
                        "{}: can't replace resource declaration\n\t{}",
                        env.display_path(&self.file),
                        source
                    ));
                }
            }
            let links_changed = !replaced.is_empty();
            warnings.iter().for_each(|w| env.warn(w));
            if links_changed {
                self.record(env, "changed links");
            }
        }

        if self.pure_html && env.settings.minify_html {
            let size = file_size(&self.file);
            let options = HtmlMinifyOptions {
                css: env.settings.minify_html_css,
                js: env.settings.minify_html_js,
            };
            content = env
                .minifiers
                .html
                .minify(&content, options)
                .map_err(|message| OptimizeError::Minify {
                    file: self.file.clone(),
                    message,
                })?;
            let new_size = content.len() as u64;
            env.info(
                "minify",
                format!("{}, {}", env.display_path(&self.file), change_percent(size, new_size)),
            );
            if size != new_size {
                self.record(env, "minified");
            }
        }

        self.entity.record_size(SizeType::Modified, content.len() as u64);
        if self.entity.has_changes() {
            write(&self.file, &content)?;
        }
        Ok(())
    }

    /// Must run after every phase that changes file content.
    pub fn gzip(&mut self, env: &Env) -> Result<()> {
        let gz = gzip(&self.file)?;
        let size = file_size(&gz.file);
        if !gz.reused {
            env.info(
                "gzip",
                format!("{}, {}", env.display_path(&self.file), change_percent(file_size(&self.file), size)),
            );
        }
        self.entity.record_size(SizeType::Gzipped, size);
        self.gzip = Some(gz.file);

        self.resources_mut().try_for_each(|res| res.gzip(env))
    }

    fn record(&mut self, env: &Env, change: &str) {
        env.observer.on_change(&self.display_name(), change);
        self.entity.record_change(change);
    }
}

impl Optimized for HtmlPage {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn display_name(&self) -> String {
        relative(&self.base_dir, &self.file)
    }

    fn side_files(&self) -> Vec<&Path> {
        self.gzip_file().into_iter().collect()
    }
}
