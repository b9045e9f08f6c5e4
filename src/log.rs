//! Logging hooks for the certseal state machines
//!
//! The issue and verify orchestrators trace every state transition through this
//! module. Unless another [`Logger`] is installed with [`set_logger`], messages are
//! forwarded to the `log` facade under the `certseal` target.

use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Logger interface for certseal debug tracing
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log a formatted debug message
    fn debugf(&self, fmt: fmt::Arguments<'_>);
}

/// A no-op logger that does nothing
#[derive(Debug, Default)]
pub struct NoopLogger;

impl NoopLogger {
    /// Create a new no-op logger
    pub fn new() -> Self {
        Self
    }

    /// Create a boxed instance
    pub fn boxed() -> Box<dyn Logger> {
        Box::new(Self::new())
    }
}

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}
    fn debugf(&self, _fmt: fmt::Arguments<'_>) {}
}

/// Forwards to the `log` crate at debug level
#[derive(Debug, Default)]
pub struct FacadeLogger;

impl FacadeLogger {
    /// Create a new facade logger
    pub fn new() -> Self {
        Self
    }

    /// Create a boxed instance
    pub fn boxed() -> Box<dyn Logger> {
        Box::new(Self::new())
    }
}

impl Logger for FacadeLogger {
    fn debug(&self, message: &str) {
        ::log::debug!(target: "certseal", "{}", message);
    }

    fn debugf(&self, fmt: fmt::Arguments<'_>) {
        ::log::debug!(target: "certseal", "{}", fmt);
    }
}

// Installed logger; `None` means "forward to the log facade"
#[doc(hidden)]
pub static LOGGER: RwLock<Option<Box<dyn Logger>>> = RwLock::new(None);

#[doc(hidden)]
pub fn read_logger() -> RwLockReadGuard<'static, Option<Box<dyn Logger>>> {
    LOGGER.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_logger() -> RwLockWriteGuard<'static, Option<Box<dyn Logger>>> {
    LOGGER.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Set the logger used for certseal debug tracing
pub fn set_logger(logger: Box<dyn Logger>) {
    *write_logger() = Some(logger);
}

/// Check if debug logging is enabled
pub fn debug_enabled() -> bool {
    read_logger().is_some() || ::log::log_enabled!(target: "certseal", ::log::Level::Debug)
}

/// Log a debug message
pub fn debug(message: &str) {
    match read_logger().as_ref() {
        Some(logger) => logger.debug(message),
        None => FacadeLogger.debug(message),
    }
}

/// Log a formatted debug message
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)*) => {{
        let global_logger = $crate::log::read_logger();
        match global_logger.as_ref() {
            Some(logger) => $crate::log::Logger::debugf(&**logger, format_args!($($arg)*)),
            None => ::log::debug!(target: "certseal", $($arg)*),
        }
    }};
}

/// Helper struct to install a logger within a scope
pub struct LoggingGuard {
    previous_logger: Option<Box<dyn Logger>>,
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("has_previous_logger", &self.previous_logger.is_some())
            .finish()
    }
}

impl LoggingGuard {
    /// Install `logger` until the guard is dropped
    pub fn new(logger: Box<dyn Logger>) -> Self {
        let previous_logger = std::mem::replace(&mut *write_logger(), Some(logger));
        Self { previous_logger }
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        *write_logger() = self.previous_logger.take();
    }
}
