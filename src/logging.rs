// Logging setup plus conditional macros that only log in debug builds

use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// Where log lines go.
#[derive(Debug)]
pub enum LogTarget<'a> {
    /// Append to a file, used while the TUI owns the terminal.
    File(&'a Path),
    Stderr,
    Off,
}

/// Installs env_logger. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(target: LogTarget<'_>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {:<5} {}] {}",
            chrono::Local::now().format(LOG_TIMESTAMP_FORMAT),
            record.level(),
            record.target(),
            record.args()
        )
    });

    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::Off => {
            builder.filter_level(LevelFilter::Off);
        }
    }

    // A logger may already be installed (tests); keep it.
    let _ = builder.try_init();
    Ok(())
}
