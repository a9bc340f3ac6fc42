use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Log level for the app's own events given the number of `-v` flags.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default for
/// other crates (reqwest, hyper); app events follow `verbosity`.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let level = level_for(verbosity);
    let app_filter = Targets::new()
        .with_target("peso_watcher", level)
        .with_default(LevelFilter::TRACE);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,peso_watcher={level}")));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_target(verbosity > 1)
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), LevelFilter::WARN);
        assert_eq!(level_for(1), LevelFilter::INFO);
        assert_eq!(level_for(2), LevelFilter::DEBUG);
        assert_eq!(level_for(7), LevelFilter::TRACE);
    }
}
