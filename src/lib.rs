pub mod adherence;
pub mod alerts;
pub mod billing;
pub mod config;
pub mod engine;
pub mod models;
pub mod safety;
pub mod vitals;

pub use engine::{ClinicalEngine, EngineError, EngineRequest, EngineResponse};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// built-in filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
