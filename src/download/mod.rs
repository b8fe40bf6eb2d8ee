//! Downloader collaborator: fetching cdn resources into the site.
//!
//! [`ResourceLoader`] implements the download policy (redirect resolution,
//! `.min.` variants, non-destructive file naming, source maps) over a
//! [`Transport`] that only knows how to `GET` a url.

mod http;
#[cfg(test)]
pub mod memory;

pub use http::HttpTransport;

use crate::error::{OptimizeError, Result};
use crate::report::Observer;
use crate::utils::path::{self, is_duplicate, min_name, remove, select_not_existing, write};
use crate::utils::sourcemap;
use crate::utils::url::{
    absolute, base_url, file_name, has_extension, is_data, is_remote, replace_file_name,
    server_root,
};
use std::path::{Path, PathBuf};

/// A fetched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub file: PathBuf,
    pub source_map: Option<PathBuf>,
    /// Url the file was actually loaded from (after redirects and `.min.` lookup).
    pub url: String,
}

pub trait Downloader {
    /// Download `url` into `target_dir`.
    ///
    /// With `prefer_min`, the `.min.` sibling url is tried first. With
    /// `source_maps`, a referenced remote source map is downloaded next to the
    /// file and its sources are embedded. When that fails, a file fetched by
    /// this call is removed again.
    fn download(
        &self,
        url: &str,
        prefer_min: bool,
        source_maps: bool,
        target_dir: &Path,
        observer: &dyn Observer,
    ) -> Result<Downloaded>;

    /// Download `url` as `target`, or a numbered sibling if `target` exists
    /// with different content. Returns the file actually holding the content.
    fn download_file(&self, url: &str, target: &Path, observer: &dyn Observer) -> Result<PathBuf>;
}

pub trait Transport {
    /// Response body of a successful `GET`.
    fn get(&self, url: &str) -> Result<Vec<u8>>;

    /// Final url after following `3xx` responses.
    fn follow_redirects(&self, url: &str) -> Result<String>;
}

/// Result of [`ResourceLoader::store`].
struct Stored {
    file: PathBuf,
    /// `false` when an identical earlier download was reused.
    fresh: bool,
}

pub struct ResourceLoader<T> {
    transport: T,
}

impl<T: Transport> ResourceLoader<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn fetch_to(&self, url: &str, file: &Path) -> Result<()> {
        let bytes = self.transport.get(url)?;
        write(file, bytes)
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.transport.get(url)?;
        String::from_utf8(bytes).map_err(|e| OptimizeError::download(url, e))
    }

    fn store(&self, url: &str, target: &Path, observer: &dyn Observer) -> Result<Stored> {
        let dir = target.parent().unwrap_or(Path::new("."));
        let name = path::file_name(target);
        let file = select_not_existing(dir, &name);
        self.fetch_to(url, &file)?;
        observer.on_info("download", url);

        if file != target {
            if is_duplicate(&file, target)? {
                remove(&file)?;
                observer.on_detail("download", &format!("{name} already downloaded, reusing it"));
                return Ok(Stored {
                    file: target.to_path_buf(),
                    fresh: false,
                });
            }
            observer.on_info(
                "download",
                &format!(
                    "stored as {} because {name} exists with different content",
                    path::file_name(&file)
                ),
            );
        }
        Ok(Stored { file, fresh: true })
    }

    /// Fetch the map referenced by `file`'s trailing `sourceMappingURL` comment.
    fn download_source_map(
        &self,
        file: &Path,
        url: &str,
        dir: &Path,
        observer: &dyn Observer,
    ) -> Result<Option<PathBuf>> {
        let Some(reference) = sourcemap::file_reference(file)? else {
            observer.on_detail("download", &format!("no source map reference in {url}"));
            return Ok(None);
        };
        if is_data(&reference) {
            return Ok(None);
        }

        let map_url = if is_remote(&reference) {
            absolute(&reference)
        } else {
            let base = if reference.starts_with('/') {
                server_root(url)
            } else {
                base_url(url)
            };
            let base = base.ok_or_else(|| OptimizeError::download(url, "can't resolve source map base"))?;
            format!("{base}{reference}")
        };

        let map_file = dir.join(file_name(&reference));
        self.fetch_to(&map_url, &map_file)?;

        let map_base = base_url(&map_url).unwrap_or_default().to_string();
        let embedded =
            match sourcemap::include_remote_sources(&map_file, &map_base, |src| self.fetch_text(src)) {
                Ok(embedded) => embedded,
                Err(e) => {
                    remove(&map_file)?;
                    return Err(match e {
                        OptimizeError::DownloadFailure { .. } => e,
                        other => OptimizeError::download(&map_url, other),
                    });
                }
            };
        if embedded > 0 {
            observer.on_info(
                "download",
                &format!("source map {} with {embedded} embedded sources", file_name(&map_url)),
            );
        }
        Ok(Some(map_file))
    }
}

impl<T: Transport> Downloader for ResourceLoader<T> {
    fn download(
        &self,
        url: &str,
        prefer_min: bool,
        source_maps: bool,
        target_dir: &Path,
        observer: &dyn Observer,
    ) -> Result<Downloaded> {
        let mut url = absolute(url);
        if !has_extension(&url) {
            let resolved = self.transport.follow_redirects(&url)?;
            if resolved != url {
                observer.on_info("download", &format!("redirect resolved: {url} -> {resolved}"));
                url = resolved;
            }
        }
        let name = file_name(&url).to_string();
        if name.is_empty() {
            return Err(OptimizeError::download(&url, "no file name in url"));
        }

        let mut loaded = None;
        let min = min_name(&name);
        if prefer_min && min != name {
            let min_url = replace_file_name(&url, &name, &min);
            match self.store(&min_url, &target_dir.join(&min), observer) {
                Ok(stored) => loaded = Some((stored, min_url)),
                Err(e) if e.is_recoverable() => {
                    observer.on_detail("download", &format!("no minified version at {min_url}"));
                }
                Err(e) => return Err(e),
            }
        }
        let (stored, url) = match loaded {
            Some(loaded) => loaded,
            None => (self.store(&url, &target_dir.join(&name), observer)?, url),
        };

        let source_map = if source_maps {
            match self.download_source_map(&stored.file, &url, target_dir, observer) {
                Ok(map) => map,
                Err(e) => {
                    if stored.fresh {
                        remove(&stored.file)?;
                    }
                    return Err(e);
                }
            }
        } else {
            None
        };

        Ok(Downloaded {
            file: stored.file,
            source_map,
            url,
        })
    }

    fn download_file(&self, url: &str, target: &Path, observer: &dyn Observer) -> Result<PathBuf> {
        self.store(url, target, observer).map(|stored| stored.file)
    }
}
