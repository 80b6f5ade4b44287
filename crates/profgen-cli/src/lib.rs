pub mod cli;

pub use cli::{build_cli_command, BuildArgs, Cli, Commands, InspectFormat};
