//! Subscriber setup shared by the binaries: `RUST_LOG` plus a default `info` directive.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

pub fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(DEFAULT_LEVEL.into())
}

/// Install the global fmt subscriber, writing to stderr so stdout stays parseable.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
