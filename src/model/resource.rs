//! Root resources: stylesheets and scripts referenced directly from a page.

use super::{Entity, Env, Optimized, SizeType, SubResource};
use crate::config::Settings;
use crate::error::{OptimizeError, Result};
use crate::html::{SourceElement, TagElement};
use crate::minify::{Minifiers, ResourceMinifier, map_path, min_path};
use crate::utils::digest::{SriAlgorithm, SriCheck, check_file_sri, file_md5, file_sri};
use crate::utils::gzip::gzip;
use crate::utils::path::{self, file_size, is_minified_name, normalize, relative, remove};
use crate::utils::size::change_percent;
use crate::utils::sourcemap::include_sources;
use crate::utils::url::{clear_params, is_remote, replace_file_name};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Js,
    Css,
}

impl ResourceKind {
    /// Attribute holding the resource url.
    pub fn url_attr(self) -> &'static str {
        match self {
            Self::Js => "src",
            Self::Css => "href",
        }
    }

    /// Download directory for remote resources of this kind.
    pub fn target_dir(self, settings: &Settings) -> PathBuf {
        match self {
            Self::Js => settings.js_target_dir(),
            Self::Css => settings.css_target_dir(),
        }
    }

    fn minifier(self, minifiers: &Minifiers) -> &dyn ResourceMinifier {
        match self {
            Self::Js => minifiers.js.as_ref(),
            Self::Css => minifiers.css.as_ref(),
        }
    }
}

/// A `<script src>` or `<link rel="stylesheet" href>` of one page.
#[derive(Debug)]
pub struct RootResource {
    pub(super) entity: Entity,
    pub(super) kind: ResourceKind,
    element: TagElement,
    /// Element as parsed, to detect whether the tag must be rewritten.
    original: TagElement,
    /// Literal opening tag text in the page.
    source: String,
    html_file: PathBuf,
    pub(super) html_dir: PathBuf,
    pub(super) base_dir: PathBuf,
    pub(super) remote: bool,
    /// Url the file was downloaded from.
    pub(super) remote_url: Option<String>,
    pub(super) file: Option<PathBuf>,
    source_map: Option<PathBuf>,
    gzip: Option<PathBuf>,
    pub(super) sub_resources: Vec<SubResource>,
}

impl RootResource {
    pub fn new(kind: ResourceKind, tag: SourceElement, html_file: &Path, base_dir: &Path) -> Self {
        Self {
            entity: Entity::default(),
            kind,
            original: tag.element.clone(),
            element: tag.element,
            source: tag.source,
            html_file: html_file.to_path_buf(),
            html_dir: html_file.parent().unwrap_or(Path::new(".")).to_path_buf(),
            base_dir: base_dir.to_path_buf(),
            remote: false,
            remote_url: None,
            file: None,
            source_map: None,
            gzip: None,
            sub_resources: Vec::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn element(&self) -> &TagElement {
        &self.element
    }

    pub fn source_declaration(&self) -> &str {
        &self.source
    }

    /// Current url attribute value.
    pub fn target(&self) -> &str {
        self.element.attr(self.kind.url_attr()).unwrap_or_default()
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn source_map(&self) -> Option<&Path> {
        self.source_map.as_deref()
    }

    pub fn gzip_file(&self) -> Option<&Path> {
        self.gzip.as_deref()
    }

    pub fn sub_resources(&self) -> &[SubResource] {
        &self.sub_resources
    }

    /// Whether the serialized tag differs from the parsed one.
    pub fn is_tag_changed(&self) -> bool {
        self.element != self.original
    }

    fn declared_integrity(&self) -> Option<String> {
        self.element
            .attr("integrity")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Drop a declared integrity that no longer matches the file, once this
    /// tool has rewritten its bytes. A new token is applied by the
    /// integrity phase.
    pub(super) fn invalidate_integrity(&mut self, env: &Env) -> Result<()> {
        let (Some(declared), Some(file)) = (self.declared_integrity(), &self.file) else {
            return Ok(());
        };
        if let SriCheck::Mismatch(_) = check_file_sri(file, &declared)? {
            self.element.remove_attr("integrity");
            self.record(env, "outdated integrity removed");
        }
        Ok(())
    }

    pub(super) fn record(&mut self, env: &Env, change: impl Into<String>) {
        let change = change.into();
        env.observer.on_change(&self.display_name(), &change);
        self.entity.record_change(change);
    }

    pub(super) fn change_target(&mut self, env: &Env, target: String) {
        let old = self.target().to_string();
        if old == target {
            return;
        }
        self.element.set_attr(self.kind.url_attr(), target.clone());
        self.record(env, format!("{old} -> {target}"));
    }

    /// Switch to another file in the same role, keeping the url shape.
    pub(super) fn change_file(&mut self, env: &Env, new_file: PathBuf) {
        let Some(old_file) = self.file.replace(new_file.clone()) else {
            return;
        };
        if old_file == new_file {
            return;
        }
        let old_name = path::file_name(&old_file);
        let new_name = path::file_name(&new_file);
        let current = self.target().to_string();
        let mut target = replace_file_name(&current, &old_name, &new_name);
        if target == current {
            target = relative(&self.html_dir, &new_file);
        }
        self.change_target(env, target);
    }

    // ========================================================================
    // Resolve
    // ========================================================================

    pub fn resolve(&mut self, env: &Env) -> Result<()> {
        let target = self.target().to_string();
        if is_remote(&target) {
            self.download(env, &target)?;
        } else {
            self.resolve_local(env, &target)?;
        }

        if let Some(file) = &self.file {
            self.entity.record_size(SizeType::Original, file_size(file));
        }
        if self.kind == ResourceKind::Css && !self.entity.is_ignored() {
            self.resolve_sub_resources(env)?;
        }
        Ok(())
    }

    fn resolve_local(&mut self, env: &Env, target: &str) -> Result<()> {
        let path = clear_params(target);
        let file = match path.strip_prefix('/') {
            Some(rooted) => self.base_dir.join(rooted),
            None => self.html_dir.join(path),
        };
        let file = normalize(&file);

        if !file.is_file() {
            let err = OptimizeError::NotFound(PathBuf::from(target));
            env.warn(format!("{}: {}", self.page_name(env), err));
            self.entity.ignore("not found");
            return Ok(());
        }
        if env.settings.is_ignored(&file) {
            self.entity.ignore("excluded");
            return Ok(());
        }

        if let Some(declared) = self.declared_integrity()
            && let SriCheck::Mismatch(actual) = check_file_sri(&file, &declared)?
        {
            return Err(OptimizeError::IntegrityMismatch {
                target: target.to_string(),
                declared,
                actual,
            });
        }

        self.file = Some(file);
        Ok(())
    }

    fn download(&mut self, env: &Env, url: &str) -> Result<()> {
        self.remote = true;
        let settings = env.settings;
        if !settings.download_resources {
            self.entity.ignore("remote resource");
            return Ok(());
        }
        if settings.is_download_ignored(url) {
            self.entity.ignore("download excluded");
            return Ok(());
        }

        // a declared hash is for the exact url, not its .min. sibling
        let declared = self.declared_integrity();
        let prefer_min = settings.prefer_min_download && declared.is_none();
        let dir = self.kind.target_dir(settings);
        let loaded = match env.downloader.download(
            url,
            prefer_min,
            settings.download_source_maps,
            &dir,
            env.observer,
        ) {
            Ok(loaded) => loaded,
            Err(e) if e.is_recoverable() => {
                env.warn(format!("{}: {}", self.page_name(env), e));
                self.entity.ignore("download fail");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if let Some(declared) = declared {
            if let SriCheck::Mismatch(actual) = check_file_sri(&loaded.file, &declared)? {
                remove(&loaded.file)?;
                if let Some(map) = &loaded.source_map {
                    remove(map)?;
                }
                return Err(OptimizeError::IntegrityMismatch {
                    target: url.to_string(),
                    declared,
                    actual,
                });
            }
            env.info("download", format!("integrity check passed for {url}"));
        }

        let local = relative(&self.html_dir, &loaded.file);
        self.file = Some(loaded.file);
        self.source_map = loaded.source_map;
        self.remote_url = Some(loaded.url);
        self.change_target(env, local);

        if self.element.remove_attr("crossorigin") {
            self.record(env, "crossorigin removed");
        }
        if self.element.remove_attr("integrity") {
            self.record(env, "integrity removed");
        }
        Ok(())
    }

    // ========================================================================
    // Minify
    // ========================================================================

    pub fn minify(&mut self, env: &Env) -> Result<()> {
        if self.entity.is_ignored() {
            return Ok(());
        }
        let Some(file) = self.file.clone() else {
            return Ok(());
        };
        if is_minified_name(&path::file_name(&file)) {
            return Ok(());
        }
        if !file.exists() {
            return self.adopt_minified(env, &file);
        }

        let original_size = file_size(&file);
        let result = self
            .kind
            .minifier(env.minifiers)
            .minify(&file, env.settings.generate_source_maps)?;
        if let Some(log) = &result.log {
            env.warn(format!("{}:\n{}", env.display_path(&file), log));
        }

        let size = file_size(&result.minified);
        env.info(
            "minify",
            format!("{}, {}", env.display_path(&file), change_percent(original_size, size)),
        );

        if let Some(map) = &result.source_map {
            include_sources(map)?;
        }
        if result.minified != file {
            remove(&file)?;
        }
        // a downloaded map describes the unminified file
        if let Some(old_map) = self.source_map.take()
            && Some(&old_map) != result.source_map.as_ref()
            && old_map.exists()
        {
            remove(&old_map)?;
        }

        self.change_file(env, result.minified);
        self.invalidate_integrity(env)?;
        if let Some(map) = result.source_map {
            self.record(env, format!("source map generated: {}", path::file_name(&map)));
            self.source_map = Some(map);
        }
        self.entity.record_size(SizeType::Modified, size);
        self.record(env, "minified");
        Ok(())
    }

    /// The file is shared with another page that already minified it.
    fn adopt_minified(&mut self, env: &Env, file: &Path) -> Result<()> {
        let minified = min_path(file);
        if !minified.is_file() {
            return Err(OptimizeError::Read(
                file.to_path_buf(),
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }
        let map = map_path(&minified);
        self.source_map = map.is_file().then_some(map);
        let size = file_size(&minified);
        self.change_file(env, minified);
        self.invalidate_integrity(env)?;
        self.entity.record_size(SizeType::Modified, size);
        self.record(env, "minified");
        Ok(())
    }

    // ========================================================================
    // Integrity, anti-cache, gzip
    // ========================================================================

    pub fn apply_integrity(&mut self, env: &Env) -> Result<()> {
        if self.entity.is_ignored() || self.element.has_attr("integrity") {
            return Ok(());
        }
        let Some(file) = &self.file else {
            return Ok(());
        };
        let token = file_sri(file, SriAlgorithm::Sha384)?;
        self.element.set_attr("integrity", token);
        self.record(env, "integrity token applied");
        Ok(())
    }

    pub fn apply_anti_cache(&mut self, env: &Env) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        if !file.is_file() {
            return Ok(());
        }
        let md5 = file_md5(file)?;
        let target = self.target();
        if target.ends_with(&md5) {
            return Ok(());
        }
        let hashed = format!("{}?{md5}", clear_params(target));
        self.change_target(env, hashed);
        Ok(())
    }

    pub fn gzip(&mut self, env: &Env) -> Result<()> {
        let Some(file) = self.file.clone() else {
            return Ok(());
        };
        if !file.is_file() {
            return Ok(());
        }
        let gz = gzip(&file)?;
        let size = file_size(&gz.file);
        if !gz.reused {
            env.info(
                "gzip",
                format!("{}, {}", env.display_path(&file), change_percent(file_size(&file), size)),
            );
        }
        self.entity.record_size(SizeType::Gzipped, size);
        self.gzip = Some(gz.file);

        if let Some(map) = &self.source_map
            && map.is_file()
        {
            gzip(map)?;
        }
        for sub in &mut self.sub_resources {
            sub.gzip(env)?;
        }
        Ok(())
    }

    pub(super) fn page_name(&self, env: &Env) -> String {
        env.display_path(&self.html_file)
    }
}

impl Optimized for RootResource {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn display_name(&self) -> String {
        match &self.file {
            Some(file) if file.starts_with(&self.base_dir) => relative(&self.base_dir, file),
            _ => self.target().to_string(),
        }
    }

    fn side_files(&self) -> Vec<&Path> {
        self.source_map().into_iter().chain(self.gzip_file()).collect()
    }
}
