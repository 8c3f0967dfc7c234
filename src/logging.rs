use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Diagnostic log directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "enroute_backup=warn",
        1 => "enroute_backup=info",
        _ => "enroute_backup=debug",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the `-v` count.
/// Calling this twice is harmless; the second call keeps the first subscriber.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
