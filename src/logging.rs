//! Logger setup. Output goes to stderr; stdout carries nothing but the window-creation diagnostic.

use std::sync::Once;

use env_logger::{Builder, Env, Target};

static INIT: Once = Once::new();

/// Installs `env_logger` at `warn`, or at whatever `RUST_LOG` asks for. Later calls do nothing.
pub fn init_logging() {
    INIT.call_once(|| {
        let installed = Builder::from_env(Env::default().default_filter_or("warn"))
            .target(Target::Stderr)
            .try_init();

        // The test harness may have got there first.
        if installed.is_ok() {
            log::debug!("logging initialized");
        }
    });
}
