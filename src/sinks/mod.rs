//! Output destinations

pub mod console;
pub mod file;
pub mod lock;

pub use console::{ConsoleEncoding, ConsoleSink};
pub use file::FileSink;
pub use lock::LockedWriter;

use crate::core::error::{AdapterError, Result};

/// One output destination receiving finished lines
///
/// Implementations serialize their own writers; `write_line` may be called
/// from many threads at once.
pub trait Sink: Send + Sync {
    /// Write one rendered line
    ///
    /// Lock trouble is pushed onto `lock_errors` rather than reported here, so
    /// the caller reports it after the sink has released its handle.
    fn write_line(&self, line: &str, lock_errors: &mut Vec<AdapterError>) -> Result<()>;
    fn name(&self) -> &str;
}
