//! Optimization model: page -> root resources (js, css) -> css sub-resources.
//!
//! Every entity owns the files it resolved and mutates only its own state.
//! Collaborators are passed in per phase through [`Env`].

mod css;
mod entity;
mod page;
mod resource;
mod sub;

pub use entity::{Entity, Optimized, SizeType};
pub use page::HtmlPage;
pub use resource::{ResourceKind, RootResource};
pub use sub::SubResource;

use crate::config::Settings;
use crate::download::Downloader;
use crate::html::HtmlParser;
use crate::minify::Minifiers;
use crate::report::Observer;
use crate::utils::path::relative;
use std::path::Path;

/// Settings and collaborators for one phase.
pub struct Env<'a> {
    pub settings: &'a Settings,
    pub downloader: &'a dyn Downloader,
    pub parser: &'a dyn HtmlParser,
    pub minifiers: &'a Minifiers,
    pub observer: &'a dyn Observer,
}

impl Env<'_> {
    /// Path shown to the user (relative to the site directory).
    pub fn display_path(&self, path: &Path) -> String {
        if path.starts_with(&self.settings.base_dir) {
            relative(&self.settings.base_dir, path)
        } else {
            path.display().to_string()
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.observer.on_warning(message.as_ref());
    }

    pub fn info(&self, module: &str, message: impl AsRef<str>) {
        self.observer.on_info(module, message.as_ref());
    }
}
