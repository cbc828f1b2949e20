//! Logging adapters.
//!
//! - [`LogEventSink`] implements [`EventSink`] by writing each
//!   [`AppEvent`] as one structured console line.
//! - [`PersistentLogger`] is the `log` backend: every record goes to the
//!   console logger, and records at Info and above are also appended to
//!   the [`PersistentLog`] so they survive deep sleep.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::logstore::PersistentLog;

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Booted { wake, boot_count } => {
                info!("BOOT  | #{} wake={:?}", boot_count, wake);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::MessageSent { kind, frames } => {
                info!("TX    | {:?} in {} frame(s)", kind, frames);
            }
            AppEvent::SendFailed { kind } => {
                info!("TX    | {:?} dropped", kind);
            }
            AppEvent::Command(cmd) => {
                info!("CMD   | {:?}", cmd);
            }
            AppEvent::LogRotated { drained } => {
                info!("LOG   | rotated ({})", if *drained { "drained" } else { "reset" });
            }
            AppEvent::EnteringDeepSleep { wakeup_secs } => {
                info!("SLEEP | deep sleep, timer wake in {} s", wakeup_secs);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Persistent tee logger
// ───────────────────────────────────────────────────────────────

/// One stored line per record.
pub fn format_line(record: &Record<'_>) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

pub struct PersistentLogger {
    store: PersistentLog,
    /// Set while a record is being written to the store.  Records raised
    /// from inside that write go to the console only.
    writing: AtomicBool,
    #[cfg(target_os = "espidf")]
    console: esp_idf_svc::log::EspLogger,
}

impl PersistentLogger {
    pub fn new(store: PersistentLog) -> Self {
        Self {
            store,
            writing: AtomicBool::new(false),
            #[cfg(target_os = "espidf")]
            console: esp_idf_svc::log::EspLogger::new(),
        }
    }

    /// Install as the global logger.  Call once, before anything logs.
    pub fn install(self, level: LevelFilter) -> Result<(), log::SetLoggerError> {
        log::set_logger(Box::leak(Box::new(self)))?;
        log::set_max_level(level);
        Ok(())
    }

    fn persist(&self, record: &Record<'_>) {
        if record.level() > Level::Info {
            return;
        }
        if self.writing.swap(true, Ordering::Acquire) {
            return;
        }
        // A full or unwritable store must never break logging.
        let _ = self.store.append(&format_line(record));
        self.writing.store(false, Ordering::Release);
    }

    #[cfg(target_os = "espidf")]
    fn console(&self, record: &Record<'_>) {
        self.console.log(record);
    }

    #[cfg(not(target_os = "espidf"))]
    fn console(&self, record: &Record<'_>) {
        println!("{}", format_line(record));
    }
}

impl Log for PersistentLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.console(record);
        self.persist(record);
    }

    fn flush(&self) {
        #[cfg(not(target_os = "espidf"))]
        {
            use std::io::Write as _;
            let _ = std::io::stdout().flush();
        }
    }
}
