use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use circleci_env::cli::output;
use circleci_env::cli::{execute_command, Cli};
use circleci_env::exitcode;

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        // help and --version go to stdout with status 0; real usage errors exit 1
        if e.use_stderr() {
            let _ = e.print();
            std::process::exit(exitcode::FAILURE);
        }
        e.exit()
    });

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Logs go to stderr; stdout carries key=value data only
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    if filter >= LevelFilter::DEBUG {
        tracing::debug!("Debug mode: {}", filter);
    }
}
