//! awake - Stay awake
//!
//! Holds a sleep inhibition until interrupted, for a duration, or until a
//! datetime.

use awake::cli::{version_line, Cli};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version_line());
        return;
    }

    let code = match awake::run(cli) {
        Ok(status) => status.code(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            awake::app::status_for(&e).code()
        }
    };

    // every assertion is released by now; run() owns the coordinator
    std::process::exit(code);
}
