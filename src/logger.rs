use std::env;

use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};


pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Logger { level }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("[{}] [{}] {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(), record.level(), record.args());
        }
    }

    fn flush(&self) {}
}


/// Installs the process logger.
///
/// When `SENTRY_DSN` is set the logger is wrapped so error records reach
/// Sentry; the returned guard must live as long as the process.
pub fn init(level: LevelFilter) -> Result<Option<sentry::ClientInitGuard>, SetLoggerError> {
    let logger = Logger::new(level);

    let guard = match env::var("SENTRY_DSN") {
        Ok(dsn) if !dsn.is_empty() => {
            let guard = sentry::init((dsn, sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            }));
            log::set_boxed_logger(Box::new(sentry_log::SentryLogger::with_dest(logger)))?;
            Some(guard)
        },
        _ => {
            log::set_boxed_logger(Box::new(logger))?;
            None
        },
    };

    log::set_max_level(level);

    Ok(guard)
}
