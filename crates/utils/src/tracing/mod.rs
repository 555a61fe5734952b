use exambox_core::EXAMBOX_LOG_VAR;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing system
///
/// The filter comes from `EXAMBOX_LOG`, then `RUST_LOG`, then defaults to
/// `info`. Output is a compact formatter on stderr, with ANSI colours only
/// when stderr is a terminal.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    init_with_default("info")
}

/// Initialize the tracing system with a caller-chosen default directive
pub fn init_with_default(
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = build_filter(default_directive)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn build_filter(default_directive: &str) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    if let Ok(directives) = std::env::var(EXAMBOX_LOG_VAR) {
        return EnvFilter::try_new(directives);
    }

    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Emit a structured event for response cache lookups
pub fn cache_event(key: &str, hit: bool) {
    if hit {
        debug!(key = %key, "cache_hit");
    } else {
        debug!(key = %key, "cache_miss");
    }
}
