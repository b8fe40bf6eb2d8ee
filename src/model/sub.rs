//! Resources referenced from inside a stylesheet (fonts, images, imports).

use super::{Entity, Env, Optimized, SizeType};
use crate::error::{OptimizeError, Result};
use crate::utils::digest::file_md5;
use crate::utils::gzip::gzip;
use crate::utils::path::{file_size, normalize, relative};
use crate::utils::size::change_percent;
use crate::utils::url::{absolute, clear_params, is_remote, join};
use std::path::{Path, PathBuf};

/// Where the referenced content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    /// Absolute remote url.
    Remote(String),
    /// Relative reference inside a downloaded stylesheet: fetched from the
    /// stylesheet's origin into a mirrored folder next to it.
    RemoteRelative { url: String, target: PathBuf },
    Local(PathBuf),
}

impl Location {
    fn key(&self) -> String {
        match self {
            Self::Remote(url) | Self::RemoteRelative { url, .. } => url.clone(),
            Self::Local(file) => format!("file:{}", file.display()),
        }
    }
}

/// `../fonts/a.woff` -> `<css_dir>/fonts/a.woff`, `a.png` -> `<css_dir>/resources/a.png`.
///
/// Parent segments are dropped so the file never lands above the stylesheet.
fn mirror_path(css_dir: &Path, url: &str) -> PathBuf {
    let path = clear_params(url);
    let (folder, name) = match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    };
    let segments: Vec<&str> = folder
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    let mut target = css_dir.to_path_buf();
    if segments.is_empty() {
        target.push("resources");
    } else {
        target.extend(segments);
    }
    target.join(name)
}

#[derive(Debug)]
pub struct SubResource {
    entity: Entity,
    /// Reference as written in the stylesheet.
    url: String,
    /// Other reference strings pointing at the same content.
    aliases: Vec<String>,
    location: Location,
    target: String,
    file: Option<PathBuf>,
    remote: bool,
    gzip: Option<PathBuf>,
    css_file: PathBuf,
    css_dir: PathBuf,
    base_dir: PathBuf,
}

impl SubResource {
    /// `base_url` is set when the stylesheet itself was downloaded.
    pub(super) fn new(url: &str, css_file: &Path, base_url: Option<&str>, base_dir: &Path) -> Self {
        let css_dir = css_file.parent().unwrap_or(Path::new(".")).to_path_buf();
        let location = if is_remote(url) {
            Location::Remote(crate::utils::url::normalize(&absolute(url)))
        } else if let Some(base) = base_url {
            Location::RemoteRelative {
                url: join(base, url),
                target: mirror_path(&css_dir, url),
            }
        } else {
            let path = clear_params(url);
            let file = match path.strip_prefix('/') {
                Some(rooted) => base_dir.join(rooted),
                None => css_dir.join(path),
            };
            Location::Local(normalize(&file))
        };

        Self {
            entity: Entity::default(),
            url: url.to_string(),
            aliases: Vec::new(),
            location,
            target: url.to_string(),
            file: None,
            remote: false,
            gzip: None,
            css_file: css_file.to_path_buf(),
            css_dir,
            base_dir: base_dir.to_path_buf(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn gzip_file(&self) -> Option<&Path> {
        self.gzip.as_deref()
    }

    /// Both references resolve to the same content.
    pub(super) fn same_location(&self, other: &SubResource) -> bool {
        self.location.key() == other.location.key()
    }

    pub(super) fn add_alias(&mut self, url: &str) {
        if url != self.url && !self.aliases.iter().any(|a| a == url) {
            self.aliases.push(url.to_string());
        }
    }

    /// Every reference string this resource stands for.
    pub(super) fn references(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.url.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    fn record(&mut self, env: &Env, change: String) {
        env.observer.on_change(&self.display_name(), &change);
        self.entity.record_change(change);
    }

    fn change_target(&mut self, env: &Env, target: String) {
        if self.target == target {
            return;
        }
        let change = format!("{} -> {target}", self.target);
        self.target = target;
        self.record(env, change);
    }

    fn css_name(&self, env: &Env) -> String {
        env.display_path(&self.css_file)
    }

    // ========================================================================
    // Resolve
    // ========================================================================

    pub(super) fn resolve(&mut self, env: &Env) -> Result<()> {
        match self.location.clone() {
            Location::Remote(url) => self.download(env, &url)?,
            Location::RemoteRelative { url, target } => self.download_relative(env, &url, &target)?,
            Location::Local(file) => self.resolve_local(env, file),
        }
        if let Some(file) = &self.file {
            self.entity.record_size(SizeType::Original, file_size(file));
        }
        Ok(())
    }

    fn download(&mut self, env: &Env, url: &str) -> Result<()> {
        self.remote = true;
        if !env.settings.download_resources {
            self.entity.ignore("remote resource");
            return Ok(());
        }
        if env.settings.is_download_ignored(url) {
            self.entity.ignore("download excluded");
            return Ok(());
        }
        let dir = self.css_dir.join("resources");
        let result = env
            .downloader
            .download(url, false, false, &dir, env.observer)
            .map(|d| d.file);
        self.adopt_download(env, result)
    }

    /// No local copy can exist, so this ignores the download toggles.
    fn download_relative(&mut self, env: &Env, url: &str, target: &Path) -> Result<()> {
        self.remote = true;
        if target.file_name().is_none() || self.url.ends_with('/') {
            env.warn(format!("{}: can't download {}", self.css_name(env), url));
            self.entity.ignore("download fail");
            return Ok(());
        }
        let result = env.downloader.download_file(url, target, env.observer);
        self.adopt_download(env, result)
    }

    fn adopt_download(&mut self, env: &Env, result: Result<PathBuf>) -> Result<()> {
        match result {
            Ok(file) => {
                let target = relative(&self.css_dir, &file);
                self.file = Some(file);
                self.change_target(env, target);
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                env.warn(format!("{}: {}", self.css_name(env), e));
                self.entity.ignore("download fail");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn resolve_local(&mut self, env: &Env, file: PathBuf) {
        if !file.is_file() {
            let err = OptimizeError::NotFound(PathBuf::from(&self.url));
            env.warn(format!("{}: {}", self.css_name(env), err));
            self.entity.ignore("not found");
        } else if env.settings.is_ignored(&file) {
            self.entity.ignore("excluded");
        } else {
            self.file = Some(file);
        }
    }

    // ========================================================================
    // Anti-cache, gzip
    // ========================================================================

    pub(super) fn apply_anti_cache(&mut self, env: &Env) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        if !file.is_file() {
            return Ok(());
        }
        let md5 = file_md5(file)?;
        if self.target.ends_with(&md5) {
            return Ok(());
        }
        let hashed = format!("{}?{md5}", clear_params(&self.target));
        self.change_target(env, hashed);
        Ok(())
    }

    pub(super) fn gzip(&mut self, env: &Env) -> Result<()> {
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
        Ok(())
    }
}

impl Optimized for SubResource {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn display_name(&self) -> String {
        match &self.file {
            Some(file) if file.starts_with(&self.base_dir) => relative(&self.base_dir, file),
            _ => self.url.clone(),
        }
    }

    fn side_files(&self) -> Vec<&Path> {
        self.gzip_file().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_path() {
        let css_dir = Path::new("/site/css");
        assert_eq!(mirror_path(css_dir, "a.png"), PathBuf::from("/site/css/resources/a.png"));
        assert_eq!(
            mirror_path(css_dir, "../fonts/a.woff2?v=4"),
            PathBuf::from("/site/css/fonts/a.woff2")
        );
        assert_eq!(
            mirror_path(css_dir, "/static/img/b.svg#icon"),
            PathBuf::from("/site/css/static/img/b.svg")
        );
    }

    #[test]
    fn test_location_of_references() {
        let css = Path::new("/site/css/lib.css");
        let base = Path::new("/site");

        let local = SubResource::new("../img/a.png?v=1", css, None, base);
        assert_eq!(local.location, Location::Local(PathBuf::from("/site/img/a.png")));

        let rooted = SubResource::new("/img/a.png", css, None, base);
        assert!(local.same_location(&rooted));

        let remote_a = SubResource::new("a.png", css, Some("https://cdn.example/lib/img/"), base);
        let remote_b = SubResource::new("../img/a.png", css, Some("https://cdn.example/lib/img/"), base);
        assert!(remote_a.same_location(&remote_b));
        assert_eq!(
            remote_a.location,
            Location::RemoteRelative {
                url: "https://cdn.example/lib/img/a.png".into(),
                target: PathBuf::from("/site/css/resources/a.png"),
            }
        );

        let absolute = SubResource::new("//cdn.example/lib/img/a.png", css, None, base);
        assert!(absolute.same_location(&remote_a));
    }

    #[test]
    fn test_aliases() {
        let mut sub = SubResource::new("a.png", Path::new("/site/css/x.css"), None, Path::new("/site"));
        sub.add_alias("a.png");
        sub.add_alias("./a.png");
        sub.add_alias("./a.png");
        assert_eq!(sub.references().collect::<Vec<_>>(), vec!["a.png", "./a.png"]);
    }
}
