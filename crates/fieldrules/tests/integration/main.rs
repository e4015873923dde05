//! Integration tests for nebula-fieldrules.

mod cancellation;
mod config;
mod defaults;
mod properties;
mod validation;

use std::sync::Once;

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
