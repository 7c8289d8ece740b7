#![warn(clippy::all)]

use std::io::{self, Write as _};
use std::process;

use structopt::StructOpt;

use acc::{Console, Opt, Result};

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let mut cnsl = Console::term();
    let stdout = io::stdout();
    let is_error = opt
        .run(&mut cnsl, &mut stdout.lock())
        .map_err(|err| {
            io::stdout().flush().unwrap_or(());
            eprintln!();
            err
        })?;
    if is_error {
        process::exit(1);
    }
    Ok(())
}
