use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use {tracing_subscriber::layer::SubscriberExt, tracing_subscriber::util::SubscriberInitExt};

/// Log to stdout and stream spans to Tracy.
///
/// A subscriber installed earlier wins, so this is safe to call from every pump.
pub fn setup() {
    let tracy_layer = tracing_tracy::TracyLayer::default();
    let fmt = tracing_subscriber::fmt::layer().with_filter(LevelFilter::DEBUG);
    let _ = tracing_subscriber::registry()
        .with(fmt)
        .with(tracy_layer)
        .try_init();
}
