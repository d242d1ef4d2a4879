use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for the application.
///
/// `RUST_LOG` takes precedence when set; otherwise `default_level` is used
/// (`error`, `warn`, `info`, `debug` or `trace`, anything else means `info`).
/// With `json` the subscriber emits one JSON object per event.
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(normalize_level(default_level)));

    // try_init so tests and repeated calls don't panic
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };
}

fn normalize_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_level_maps_aliases_and_unknowns() {
        assert_eq!(normalize_level("WARNING"), "warn");
        assert_eq!(normalize_level("Debug"), "debug");
        assert_eq!(normalize_level("loud"), "info");
    }

    #[test]
    fn init_accepts_levels() {
        // Should not panic
        init("info", false);
        init("debug", true);
        init("warn", false);
    }
}
