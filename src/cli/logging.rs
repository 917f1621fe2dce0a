//! Logging initialization

/// Initialize logging based on the debug flag
///
/// Logs go to stderr; RUST_LOG overrides the default filter level.
pub fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .init();
}
