//! Stateless helpers used across the optimization phases.

pub mod css;
pub mod digest;
pub mod gzip;
pub mod path;
pub mod size;
pub mod sourcemap;
pub mod url;
