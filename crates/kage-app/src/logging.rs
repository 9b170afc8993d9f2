use tracing_subscriber::EnvFilter;

/// Initialise logging once for the process. `RUST_LOG` overrides the default
/// `info` level. Colors are only used when stderr is a terminal.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_writer(std::io::stderr)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
