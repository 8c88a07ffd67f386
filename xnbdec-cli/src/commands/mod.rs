//! Subcommand implementations.

mod extract;
mod info;

pub use extract::cmd_extract;
pub use info::cmd_info;
