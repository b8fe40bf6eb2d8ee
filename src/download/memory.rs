//! In-memory [`Transport`] for tests.

use super::Transport;
use crate::error::{OptimizeError, Result};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct MemoryTransport {
    files: FxHashMap<String, Vec<u8>>,
    redirects: FxHashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MemoryTransport {
    pub fn with(mut self, url: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.to_string(), content.into());
        self
    }

    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Urls requested through `get`, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for MemoryTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| OptimizeError::download(url, "404 Not Found"))
    }

    fn follow_redirects(&self, url: &str) -> Result<String> {
        let mut current = url.to_string();
        while let Some(next) = self.redirects.get(&current) {
            current = next.clone();
        }
        Ok(current)
    }
}

/// Shared handle, so requests stay inspectable after the loader is moved.
impl Transport for Rc<MemoryTransport> {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url)
    }

    fn follow_redirects(&self, url: &str) -> Result<String> {
        (**self).follow_redirects(url)
    }
}
