//! `ddrgen` command-line entry point.

use ddrgen::{Command, USAGE};

fn main() {
    ddrgen::init_tracing();

    let config = match Command::from_args(std::env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(err) => {
            eprintln!("error: {err} (see `ddrgen --help`)");
            std::process::exit(1);
        }
    };

    if let Err(err) = ddrgen::run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
