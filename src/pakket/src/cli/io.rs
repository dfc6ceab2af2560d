use std::{
    fs,
    io::{self, IsTerminal, Read, Write},
    path::Path,
    process,
};

use clap::CommandFactory;
use eyre::WrapErr;

use super::{Cli, HYPHEN};

/// Reads all input bytes from a file, or from stdin for `-`.
///
/// This function will terminate the process and print the running
/// command's help if stdin is connected to a terminal.
pub fn read_input(path: &Path) -> eyre::Result<Vec<u8>> {
    if path.as_os_str() != HYPHEN {
        return fs::read(path)
            .wrap_err_with(|| format!("failed to read input file '{}'", path.display()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        let _ = Cli::command().print_help();
        process::exit(2);
    }

    let mut data = Vec::new();
    stdin.lock().read_to_end(&mut data)?;

    Ok(data)
}

/// Writes output bytes to a file, or to stdout for `-`.
pub fn write_output(path: &Path, data: &[u8]) -> eyre::Result<()> {
    if path.as_os_str() != HYPHEN {
        return fs::write(path, data)
            .wrap_err_with(|| format!("failed to write output file '{}'", path.display()));
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(data)?;
    stdout.flush()?;

    Ok(())
}
