use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; `debug` is enabled via
/// the `debug` flag, in which case `RUST_LOG` may override it.
pub fn init(debug: bool) {
    // Without the flag the level stays pinned so a stray `RUST_LOG` in the
    // host environment cannot flood the page console.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init(false);
        init(true);
        tracing::debug!("logging initialised twice");
    }
}
