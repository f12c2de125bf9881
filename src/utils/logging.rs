// Fri Feb 6 2026 - Alex

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Colored stderr logger for the CLI driver.
struct ColoredLogger {
    level: LevelFilter,
}

impl ColoredLogger {
    fn format_level(level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }
}

impl Log for ColoredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {} {}",
                Self::format_level(record.level()),
                format!("[{}]", record.target()).dimmed(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn level_from_verbosity(verbosity: usize) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_logger(level: LevelFilter) {
    log::set_boxed_logger(Box::new(ColoredLogger { level })).ok();
    log::set_max_level(level);
}

/// RUST_LOG-driven init, for embedding contexts.
pub fn init_from_env() {
    env_logger::init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }
}
