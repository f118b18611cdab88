use reposync::presentation::cli::CliApp;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so the report on stdout stays parseable.
/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8, color: bool) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "warn,reposync=info",
        2 => "warn,reposync=debug",
        _ => "debug,reposync=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .init();
}

fn main() {
    let app = CliApp::new();
    init_logging(app.cli().verbose, !app.cli().no_color);

    std::process::exit(app.run());
}
