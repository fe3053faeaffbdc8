use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::CliArgs;

fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    chordmap::logging::init(args.verbose);

    let mut stdout = std::io::stdout().lock();
    let clean = cli::run(args, &mut stdout)?;
    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
