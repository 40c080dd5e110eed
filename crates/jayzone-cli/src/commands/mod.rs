//! Command implementations for the CLI.

mod cache;
mod config;
mod goals;
mod import;
mod summary;
mod zones;

pub use cache::cmd_cache;
pub use config::cmd_config;
pub use goals::cmd_goals;
pub use import::cmd_import;
pub use summary::cmd_summary;
pub use zones::cmd_zones;
