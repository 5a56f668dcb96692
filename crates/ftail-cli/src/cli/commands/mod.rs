//! CLI command handlers, one file per command.

mod config;
mod follow;
mod probe;

pub use config::run_config;
#[cfg(test)]
pub use follow::build_specs;
pub use follow::{run_follow, FollowArgs};
pub use probe::run_probe;
