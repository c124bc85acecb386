//! Logging infrastructure for structured console output.

mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{FileEntry, FileStatus, Log};

/// Create a Logger backed by an isolated per-thread tracing subscriber that
/// formats through the console formatter into the test harness's captured
/// output.
///
/// Returns a [`tracing::dispatcher::DefaultGuard`] that must be kept alive
/// for the duration of the test; dropping it restores the previous
/// thread-local dispatcher.
#[cfg(test)]
pub(crate) fn isolated_logger() -> (Logger, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _};
    let layer = fmt::layer()
        .event_format(subscriber::ShellgenFormatter)
        .with_writer(fmt::TestWriter::new())
        .with_filter(LevelFilter::DEBUG);
    let subscriber = tracing_subscriber::registry().with(layer);
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (Logger::new(), guard)
}
