use std::io;

use pacer_cli::commands::generate::{self, GenerateArgs};

fn main() -> anyhow::Result<()> {
    pacer_cli::init_logging();

    let matches = generate::command().get_matches();
    let args = GenerateArgs::from_matches(&matches)?;

    generate::run(&args, io::stdout().lock())?;
    Ok(())
}
