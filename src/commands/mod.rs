//! CLI command handlers.

mod check;
mod config;
mod wash;

pub use check::run_check_command;
pub use config::run_config_show_command;
pub use wash::run_wash_command;
