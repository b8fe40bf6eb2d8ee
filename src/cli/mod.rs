//! CLI argument definitions.

mod args;

pub use args::{Cli, OptimizeArgs};
