//! Freshness of generated siblings (`.gz`).

mod mtime;

pub use mtime::is_sibling_fresh;
