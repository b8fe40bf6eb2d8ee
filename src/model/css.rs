//! Stylesheet references: resolving, hashing and rewriting `url(..)` targets.

use super::{Env, RootResource, SubResource};
use crate::error::{OptimizeError, Result};
use crate::utils::css::{find_links, rewrite_links};
use crate::utils::path::{is_duplicate, read_text, write};
use crate::utils::url::base_url;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

impl RootResource {
    pub(super) fn resolve_sub_resources(&mut self, env: &Env) -> Result<()> {
        let Some(file) = self.file.clone() else {
            return Ok(());
        };
        let content = read_text(&file)?;
        let base = self.remote_url.as_deref().and_then(base_url).map(str::to_string);

        let mut subs: Vec<SubResource> = Vec::new();
        let mut seen = FxHashSet::default();
        for link in find_links(&content) {
            if !seen.insert(link.url) {
                continue;
            }

            let sub = SubResource::new(link.url, &file, base.as_deref(), &self.base_dir);
            match subs.iter_mut().find(|s| s.same_location(&sub)) {
                Some(existing) => existing.add_alias(link.url),
                None => subs.push(sub),
            }
        }
        if subs.is_empty() {
            return Ok(());
        }

        for sub in &mut subs {
            sub.resolve(env)?;
            if env.settings.apply_anti_cache {
                sub.apply_anti_cache(env)?;
            }
        }

        let rewritten = rewrite_links(&content, |url| {
            subs.iter()
                .find(|s| s.references().any(|r| r == url))
                .filter(|s| s.target() != url)
                .map(|s| s.target().to_string())
        });
        self.sub_resources = subs;
        if rewritten == content {
            return Ok(());
        }

        write(&file, &rewritten)?;
        self.record(env, "sub-resource links updated");
        self.invalidate_integrity(env)?;
        if self.remote {
            self.check_duplicates(env, &file)?;
        }
        Ok(())
    }

    /// Another page may already have downloaded and rewritten the same
    /// stylesheet. Keep that copy and drop this one.
    fn check_duplicates(&mut self, env: &Env, file: &Path) -> Result<()> {
        let Some(dir) = file.parent() else {
            return Ok(());
        };
        for candidate in sibling_files(dir, file)? {
            if is_duplicate(file, &candidate)? {
                env.info(
                    "download",
                    format!("{} is a copy of {}", env.display_path(file), env.display_path(&candidate)),
                );
                fs::remove_file(file).map_err(|e| OptimizeError::Write(file.to_path_buf(), e))?;
                self.change_file(env, candidate);
                break;
            }
        }
        Ok(())
    }
}

/// Files in `dir` with the extension of `file`, sorted by name.
fn sibling_files(dir: &Path, file: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| OptimizeError::Read(dir.to_path_buf(), e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path != file && path.is_file() && path.extension() == file.extension())
        .collect();
    files.sort();
    Ok(files)
}
