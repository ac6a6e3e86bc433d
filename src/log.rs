//! One logger setup for the CLI, the benchmark runner and the browser build.

/// Environment variable that turns on debug logging in the native binaries.
pub const DEBUG_ENV_VAR: &str = "CROISEMENT_DEBUG";

/// Whether [`DEBUG_ENV_VAR`] is set (to anything).
#[cfg(not(target_arch = "wasm32"))]
#[must_use]
pub fn debug_requested() -> bool {
    std::env::var_os(DEBUG_ENV_VAR).is_some()
}

fn level_for(debug_enabled: bool) -> log::LevelFilter {
    if debug_enabled {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Initialize logging.
///
/// - Native: plain `LEVEL message` lines on stderr; `RUST_LOG`, when set,
///   overrides the level chosen by `debug_enabled`.
/// - WASM: browser console via `console_log`.
///
/// Calling it twice is harmless: the second call only logs a warning.
pub fn init_logger(debug_enabled: bool) {
    let level = level_for(debug_enabled);

    #[cfg(target_arch = "wasm32")]
    {
        let console_level = level.to_level().unwrap_or(log::Level::Info);
        match console_log::init_with_level(console_level) {
            Ok(()) => log::info!("croisement (wasm) logging at {console_level:?}"),
            Err(e) => {
                let msg = format!("croisement: console logging unavailable ({e})");
                web_sys::console::error_1(&msg.into());
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(level)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false);

        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse_filters(&spec);
        }

        match builder.try_init() {
            Ok(()) => log::debug!("croisement logging at {level:?}"),
            Err(e) => log::warn!("logger already initialized: {e}"),
        }
    }
}
