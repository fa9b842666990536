use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use lazy_static::lazy_static;
use log::{LevelFilter, SetLoggerError};
use log::{Metadata, Record};

use crate::PROGRESS_BAR;

lazy_static! {
    /// Per-run log file, written next to the console output while attached.
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let msg = format_record(record);

            if let Ok(mut file) = LOG_FILE.lock() {
                if let Some(file) = file.as_mut() {
                    let _ = writeln!(file, "{}", msg);
                }
            }

            if PROGRESS_BAR.is_hidden() {
                eprintln!("{}", msg);
            } else {
                PROGRESS_BAR.println(msg);
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = LOG_FILE.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<8} [Swarm] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.args()
    )
}

static LOGGER: Logger = Logger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}

/// Starts copying every log line into `path`.
pub fn attach_log_file(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    *LOG_FILE.lock().expect("Could not acquire log file lock") = Some(file);

    Ok(())
}

/// Stops writing into the log file and closes it.
pub fn detach_log_file() {
    log::logger().flush();
    LOG_FILE
        .lock()
        .expect("Could not acquire log file lock")
        .take();
}
