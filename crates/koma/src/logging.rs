//! Logger setup.
//!
//! Everything logs through the `log` facade. The binary calls
//! [`init_logging`] once, before anything else, with the filter from
//! [`EngineConfig::log_filter`](crate::config::EngineConfig::log_filter).
//! Lua output from `console.log` uses the [`SCRIPT_TARGET`] target so it can be
//! filtered separately (`RUST_LOG=script=warn`).

use std::sync::Once;

/// Log target for messages produced by Lua code.
pub const SCRIPT_TARGET: &str = "script";

static INIT: Once = Once::new();

/// Initialize the global `env_logger` once; later calls are ignored.
///
/// `RUST_LOG` wins over `filter`, which wins over the `info` default. wgpu is
/// chatty at info level, so it is capped at `warn` unless a filter says
/// otherwise.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(log::LevelFilter::Info)
            .filter_module("wgpu_core", log::LevelFilter::Warn)
            .filter_module("wgpu_hal", log::LevelFilter::Warn)
            .filter_module("naga", log::LevelFilter::Warn);

        if let Ok(env) = std::env::var("RUST_LOG") {
            builder.parse_filters(&env);
        } else if let Some(filter) = filter {
            builder.parse_filters(filter);
        }

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
