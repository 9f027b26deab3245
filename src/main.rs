use anyhow::Result;
use clap::Parser;
use intact::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
