use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use tracing::info;

use profgen_cli::cli::build_cli_command;

/// Print the completion script for `shell`, or write it to `out`.
pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    let bin = cmd.get_name().to_string();
    let mut script = Vec::new();
    generate(shell, &mut cmd, bin, &mut script);

    let Some(path) = out else {
        io::stdout().write_all(&script)?;
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory '{}'", parent.display()))?;
    }
    fs::write(path, &script)
        .with_context(|| format!("writing completion script '{}'", path.display()))?;
    info!(shell = %shell, path = %path.display(), bytes = script.len(), "Wrote completion script");
    println!("Wrote {shell} completion to {}", path.display());
    Ok(())
}
