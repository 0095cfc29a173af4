use clap::Parser;
use tracing::debug;

use save_runner::cli::Cli;
use save_runner::commands::{RunOptions, run};
use save_runner::{EXIT_CONFIG_ERROR, EXIT_TEST_FAILURE, SaveError};

fn main() {
    let cli = Cli::parse();
    std::process::exit(run_main(&cli));
}

fn run_main(cli: &Cli) -> i32 {
    let options = match RunOptions::from_cli(cli) {
        Ok(options) => options,
        Err(e) => {
            init_logging(cli.debug, cli.quiet);
            return report_error(&e);
        }
    };
    init_logging(options.debug, options.quiet);
    debug!(?options, "resolved options");

    match run(&options) {
        Ok(exit_code) => exit_code,
        Err(e) => report_error(&e),
    }
}

fn report_error(error: &SaveError) -> i32 {
    if error.is_config_error() {
        eprintln!("Configuration error: {error}");
        EXIT_CONFIG_ERROR
    } else {
        eprintln!("Error: {error}");
        EXIT_TEST_FAILURE
    }
}

fn init_logging(debug: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}
