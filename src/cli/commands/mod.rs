pub mod completions;
pub mod config_cmd;
pub mod lookup;
