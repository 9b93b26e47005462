//! Log output over the serial console.
//!
//! Installs a `log` backend that formats each record into a fixed buffer and
//! prints it with esp-println. Lines longer than the buffer are truncated.

use core::fmt::Write;

use heapless::String;
use log::{LevelFilter, Log, Metadata, Record};

/// Maximum length of a single log line
const MAX_LOG_LINE_LEN: usize = 256;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Install the console logger.
///
/// Must be called once during startup; later calls are ignored.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line: String<MAX_LOG_LINE_LEN> = String::new();
        // A full buffer just cuts the line short
        let _ = write!(line, "{} {}: {}", record.level(), record.target(), record.args());
        esp_println::println!("{}", line);
    }

    fn flush(&self) {}
}
