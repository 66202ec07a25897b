//! Shared utilities for kide.

mod env;
mod locate;

pub use env::{is_secret_env_var, scrub_secret_env};
pub use locate::{
    ExecutableSource, ExecutableSpec, LocateError, LocatedExecutable, locate_executable,
};
