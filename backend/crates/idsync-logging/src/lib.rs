//! Process-wide log setup for the idsync binaries.
//!
//! Both binaries share one line format; they differ only in where lines go.
//! The server writes to stdout or a file, the CLI to stderr so stdout stays
//! machine-readable.

mod error;
mod logger;


pub use error::{LoggingError, Result as LoggingResult};
pub use logger::{LogTarget, LoggerSettings, build_dispatch, initialize, render_line};
