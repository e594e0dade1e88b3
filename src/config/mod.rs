//! Configuration loading for preflight runs.
//!
//! Configuration is optional: every field has a default, so the tool runs
//! with no file at all. Precedence is environment over file over defaults.

mod parser;
mod spec;

pub use parser::{find_config_file, ConfigParser, DEFAULT_CONFIG_FILES};
pub use spec::PreflightConfig;
