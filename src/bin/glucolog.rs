use glucolog::init_tracing;
use glucolog::log::parse_cli_log;
use glucolog::menu::{run, select_mode, wait_for_enter};
use std::io::{stdin, stdout};
use tracing::error;

fn main() {
    let config = parse_cli_log();
    init_tracing(config.verbose);

    let stdin = stdin();
    let mut input = stdin.lock();
    let mut output = stdout();

    let mode = match config.mode {
        Some(m) => Some(m),
        None => select_mode(&mut input, &mut output).unwrap_or_else(|e| {
            error!("could not read the mode: {}", e);
            None
        }),
    };

    if let Some(mode) = mode {
        if let Err(e) = run(mode, &mut input, &mut output, &config) {
            error!("{}", e);
        }
    }

    if config.pause {
        if let Err(e) = wait_for_enter(&mut input, &mut output) {
            error!("{}", e);
        }
    }
}
