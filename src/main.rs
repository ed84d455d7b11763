use std::io;
use std::process;

use studentbase::{Config, Shell};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let result = Shell::open(&config, stdin.lock(), io::stdout())
        .and_then(|mut shell| shell.run());

    if let Err(err) = result {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
