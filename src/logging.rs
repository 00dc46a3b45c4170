//! `log` backend writing to a console such as the SoC UART.
//!
//! The logger lives in a `static` owned by the application, so no allocator
//! is needed:
//!
//! ```ignore
//! static TICKS: AtomicUsize = AtomicUsize::new(0);
//! static LOGGER: ConsoleLogger<Uart> =
//!     ConsoleLogger::new(Uart::new(UART_BASE), Some(&TICKS), LevelFilter::Info);
//!
//! ctkey::logging::init_logging(&LOGGER);
//! ```

use core::{
    cell::RefCell,
    fmt::{self, Write},
    sync::atomic::{AtomicUsize, Ordering},
};

pub struct ConsoleLogger<W> {
    console: critical_section::Mutex<RefCell<W>>,
    tick_count: Option<&'static AtomicUsize>,
    level: log::LevelFilter,
}

impl<W> ConsoleLogger<W> {
    /// `tick_count` is a millisecond counter used to timestamp lines.
    pub const fn new(
        console: W,
        tick_count: Option<&'static AtomicUsize>,
        level: log::LevelFilter,
    ) -> Self {
        Self {
            console: critical_section::Mutex::new(RefCell::new(console)),
            tick_count,
            level,
        }
    }

    pub fn level(&self) -> log::LevelFilter {
        self.level
    }

    fn millis(&self) -> usize {
        self.tick_count
            .map_or(0, |ticks| ticks.load(Ordering::Relaxed))
    }
}

/// Milliseconds rendered as `secs.millis`.
struct Timestamp(usize);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl<W: Send + Write> log::Log for ConsoleLogger<W> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let stamp = Timestamp(self.millis());
        critical_section::with(|cs| {
            let mut console = self.console.borrow(cs).borrow_mut();
            // A console that cannot take the line has nowhere to report it.
            let _ = writeln!(
                console,
                "{} {} [{}] {}",
                record.level(),
                stamp,
                record.module_path().unwrap_or("ctkey"),
                record.args()
            );
        });
    }

    fn flush(&self) {}
}

/// Installs `logger` as the global logger at its own level. Returns `false`
/// if another logger was installed first.
pub fn init_logging<W: Send + Write>(logger: &'static ConsoleLogger<W>) -> bool {
    match log::set_logger(logger) {
        Ok(()) => {
            log::set_max_level(logger.level());
            true
        }
        Err(_) => false,
    }
}
