use anyhow::Result;
use tracing::{info, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan, Layer};
use tracing_subscriber::{registry, EnvFilter};

pub fn build_reduced_logger_text<S>() -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if cfg!(debug_assertions) {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_line_number(false)
                .with_thread_names(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
                .event_format(tracing_subscriber::fmt::format().compact()),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true),
        )
    }
}

/// Log level filter from `RUST_LOG`, `warn` when unset or invalid.
pub fn build_loglevel_filter_layer(debug: bool) -> EnvFilter {
    let fallback = if debug { "info" } else { "warn" };
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| fallback.to_string());

    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub fn init_telemetry_and_tracing(debug: bool) -> Result<()> {
    let subscriber = registry()
        .with(build_loglevel_filter_layer(debug))
        .with(build_reduced_logger_text());
    tracing::subscriber::set_global_default(subscriber)?;
    info!("Tracing initialized");

    Ok(())
}
