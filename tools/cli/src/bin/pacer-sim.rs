use std::io::{self, BufWriter};

use pacer_cli::commands::simulate::{self, SimulateArgs};

fn main() -> anyhow::Result<()> {
    pacer_cli::init_logging();

    let matches = simulate::command().get_matches();
    let args = SimulateArgs::from_matches(&matches);

    let stdout = io::stdout();
    simulate::run(&args, BufWriter::new(stdout.lock()))
}
