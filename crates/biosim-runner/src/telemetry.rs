//! Log subscriber setup for the runner.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default filter,
/// and `BIOSIM_LOG_JSON=1` switches to one JSON object per event.
pub fn init_tracing() {
    let json = std::env::var("BIOSIM_LOG_JSON").map_or(false, |v| v == "1");

    let (plain_layer, json_layer) = if json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (Some(fmt::layer().with_target(true)), None)
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,biosim_world=debug".into()),
        )
        .with(plain_layer)
        .with(json_layer)
        .init();

    info!(json, "Logging initialized");
}
