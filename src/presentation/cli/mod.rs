//! CLI module

mod commands;
mod render;

pub use commands::{Cli, Commands};
pub use render::{batch_progress, print_check, print_engines, print_result};
