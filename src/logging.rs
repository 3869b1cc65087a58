use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at info, or debug with `verbose`.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "competency_import=debug"
    } else {
        "competency_import=info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
