//! `log` backend: the browser console on wasm32, `env_logger` elsewhere.

use log::{Level, LevelFilter};

fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{target}] {level}: {message}")
}

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, Log, Metadata, Record};
    use wasm_bindgen::JsValue;

    pub(super) struct ConsoleLogger;

    pub(super) static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let line =
                super::format_record(record.level(), record.target(), &record.args().to_string());
            let value = JsValue::from_str(&line);
            match record.level() {
                Level::Error => web_sys::console::error_1(&value),
                Level::Warn => web_sys::console::warn_1(&value),
                Level::Info => web_sys::console::info_1(&value),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
            }
        }

        fn flush(&self) {}
    }
}

/// Install the logger. Safe to call more than once; later calls only adjust
/// the level.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) {
    // Err means a logger is already installed (ours or the host's).
    let _ = log::set_logger(&console::LOGGER);
    log::set_max_level(level);
}

/// Install the logger. Safe to call more than once; later calls only adjust
/// the level.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LevelFilter) {
    use std::io::Write;

    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_record(record.level(), record.target(), &record.args().to_string())
            )
        })
        .try_init();
    log::set_max_level(level);
}
