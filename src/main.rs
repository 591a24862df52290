pub mod cart;
pub mod inventory;
pub mod item;
pub mod logger;
pub mod repl;

use crate::repl::{invalid_command, run, Cli};
use clap::Parser;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            invalid_command(&e);
            return;
        }
        Err(e) => e.exit(),
    };
    if let Err(e) = logger::init(cli.log_level()) {
        eprintln!("{}", e);
    }
    match run(cli) {
        Ok(_) => (),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
