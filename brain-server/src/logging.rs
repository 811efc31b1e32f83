use crate::config::LoggingSettings;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber once. `RUST_LOG` wins over the configured
/// level.
pub fn init_tracing(settings: &LoggingSettings) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = fmt().with_env_filter(filter).with_target(false).with_level(true);
        if settings.json {
            builder.json().with_current_span(true).init();
        } else {
            builder.init();
        }
    });
}
