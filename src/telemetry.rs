// telemetry.rs
// Console logging setup for the binary.
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `debug` when set.
pub fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_directives = if debug {
        "info,scheduler=debug,chunk_scheduling=debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_names(true)
                .with_target(false)
                .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string())),
        )
        .try_init()?;
    Ok(())
}
