use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::{stderr, stdout, Write};
use std::sync::Once;

/// Log implementation for standard output streams
///
/// Errors go to standard error, everything else to standard output, prefixed by a short tag.
pub struct StdLogger {
    level: LevelFilter,
}

impl StdLogger {
    /// Initialize logger
    ///
    /// Verbose sessions log up to `Info`, otherwise only warnings and errors are shown. Even if
    /// this function is called multiple times, initialization will only be done once. If another
    /// logger has already been installed, that one stays in place.
    pub fn init(verbose: bool) {
        static INIT: Once = Once::new();

        INIT.call_once(|| {
            let level = Self::level_for(verbose);
            if log::set_boxed_logger(Box::new(StdLogger { level })).is_ok() {
                log::set_max_level(level);
            }
        });
    }

    fn level_for(verbose: bool) -> LevelFilter {
        if verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }

    fn tag(level: Level) -> &'static str {
        match level {
            Level::Error | Level::Warn => "[-]",
            Level::Info => "[i]",
            Level::Debug | Level::Trace => "[+]",
        }
    }
}

impl Log for StdLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = Self::tag(record.level());
        if record.level() == Level::Error {
            let _ = writeln!(stderr().lock(), "{} {}", tag, record.args());
        } else {
            let _ = writeln!(stdout().lock(), "{} {}", tag, record.args());
        }
    }

    /// Flush buffered output stream
    fn flush(&self) {
        let _ = stdout().flush();
    }
}
