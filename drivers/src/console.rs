//! Character console on top of a serial port.
//!
//! [`Console`] turns any [`SerialPort`] into a `core::fmt::Write` sink with
//! `putchar`-style output. One console can be installed globally; the
//! [`uprint!`]/[`uprintln!`] macros and [`ConsoleLogger`] write to it.
//!
//! Bytes pass through unchanged. Callers that want CR/LF line endings write
//! them (`uprintln!` appends `"\r\n"`).

use crate::hal::serial::SerialPort;
use crate::peripheral::usart::Usart;
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Returned by [`put_char`] when no console is installed.
pub const EOF: i32 = -1;

/// A serial port used as a character device.
pub struct Console<S: SerialPort> {
    port: S,
}

impl<S: SerialPort> Console<S> {
    pub const fn new(port: S) -> Self {
        Self { port }
    }

    /// Give the port back.
    pub fn into_inner(self) -> S {
        self.port
    }

    pub fn port(&mut self) -> &mut S {
        &mut self.port
    }

    /// Transmit the low byte of `ch` and return `ch`, or [`EOF`] if the
    /// port reported an error.
    pub fn put_char(&mut self, ch: i32) -> i32 {
        match self.port.write_byte(ch as u8) {
            Ok(()) => ch,
            Err(_) => EOF,
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), S::Error> {
        self.port.write(bytes).map(|_| ())
    }

    /// Wait for the next received byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.port.read_byte().ok()
    }

    /// Take a received byte if one is waiting.
    ///
    /// Always `None` on ports without a non-blocking interface.
    pub fn try_read_byte(&mut self) -> Option<u8> {
        self.port.as_nonblocking()?.try_read_byte().ok()
    }
}

impl<S: SerialPort> fmt::Write for Console<S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

// ============================================================================
// Global console
// ============================================================================

static CONSOLE: Mutex<Option<Console<Usart>>> = Mutex::new(None);

/// Route the global console to `port`. Returns the port it replaces.
pub fn install(port: Usart) -> Option<Usart> {
    CONSOLE
        .lock()
        .replace(Console::new(port))
        .map(Console::into_inner)
}

/// Detach the global console and return its port.
pub fn uninstall() -> Option<Usart> {
    CONSOLE.lock().take().map(Console::into_inner)
}

pub fn is_installed() -> bool {
    CONSOLE.lock().is_some()
}

/// Run `f` on the global console. `None` if no console is installed.
pub fn with_console<T>(f: impl FnOnce(&mut Console<Usart>) -> T) -> Option<T> {
    CONSOLE.lock().as_mut().map(f)
}

/// `putchar` for the global console.
pub fn put_char(ch: i32) -> i32 {
    with_console(|console| console.put_char(ch)).unwrap_or(EOF)
}

/// Write `s` to the global console. Dropped if none is installed.
pub fn write_str(s: &str) {
    with_console(|console| {
        let _ = console.write_bytes(s.as_bytes());
    });
}

/// Block until the global console receives a byte.
pub fn read_byte() -> Option<u8> {
    with_console(Console::read_byte).flatten()
}

pub fn try_read_byte() -> Option<u8> {
    with_console(Console::try_read_byte).flatten()
}

/// `fmt::Write` handle on the global console.
pub struct ConsoleWriter;

impl fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        with_console(|console| fmt::Write::write_str(console, s)).unwrap_or(Ok(()))
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    let _ = fmt::Write::write_fmt(&mut ConsoleWriter, args);
}

// ============================================================================
// Print Macros
// ============================================================================

/// Print to the global console without a line ending.
#[macro_export]
macro_rules! uprint {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

/// Print to the global console followed by `"\r\n"`.
#[macro_export]
macro_rules! uprintln {
    () => { $crate::uprint!("\r\n") };
    ($($arg:tt)*) => {{
        $crate::uprint!($($arg)*);
        $crate::uprint!("\r\n");
    }};
}

// ============================================================================
// Logger
// ============================================================================

/// `log` backend writing one line per record to the global console.
///
/// Uses `try_lock`: a record emitted while the console is held (for
/// example from inside [`with_console`]) is dropped.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Format `record` as `[LEVEL] target: message\r\n`.
pub fn write_record(w: &mut impl fmt::Write, record: &Record<'_>) -> fmt::Result {
    write!(w, "[{}] {}: {}\r\n", record.level(), record.target(), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(mut slot) = CONSOLE.try_lock() {
            if let Some(console) = slot.as_mut() {
                let _ = write_record(console, record);
            }
        }
    }

    fn flush(&self) {
        if let Some(mut slot) = CONSOLE.try_lock() {
            if let Some(console) = slot.as_mut() {
                let _ = console.port().flush();
            }
        }
    }
}

/// Install [`ConsoleLogger`] as the `log` backend.
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
