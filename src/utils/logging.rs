//! Logging setup plus per-module switchable logging macros.
//!
//! Loops that run once a second (chunk recorder, tickers) would flood the log,
//! so their modules declare a flag and log through these macros:
//! ```ignore
//! const ENABLE_LOGS: bool = false;
//! use crate::{log_debug, log_info};
//!
//! log_info!("chunk loop started");
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` (reads `RUST_LOG`, defaults to Info). Safe to call repeatedly.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init();
    });
}

/// `log::debug!` gated on the caller's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::info!` gated on the caller's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}
