use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Container Errors
/// - [`Error::FileError`] - The container could not be opened or read
/// - [`Error::Empty`] - The container has no content
/// - [`Error::NotSupported`] - Unknown magic, version or byte order
/// - [`Error::Malformed`] - Corrupted or inconsistent container structure
/// - [`Error::OutOfBounds`] - A table index or offset points outside the container
///
/// ## Decoding Errors
/// - [`Error::InvalidOpcode`] - An unused opcode slot was found in a code item
/// - [`Error::InvalidDescriptor`] - A type descriptor could not be decoded
///
/// # Examples
///
/// ```rust,no_run
/// use dextree::{disassemble, Error};
///
/// match disassemble(&["classes.dex"]) {
///     Ok(tree) => println!("{} containers", tree.containers().len()),
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {io_err}"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed container: {message} ({file}:{line})")
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The container is damaged and could not be parsed.
    ///
    /// The error records the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the container.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This container type, version or byte order is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error, raised when a container path cannot be opened.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures, such as a failed memory mapping.
    #[error("{0}")]
    Error(String),

    /// A code item contained an opcode from one of the unused slots.
    #[error("Invalid opcode - 0x{0:02X}")]
    InvalidOpcode(u8),

    /// A type descriptor was empty, or consisted of array markers only.
    #[error("Invalid type descriptor - {0:?}")]
    InvalidDescriptor(String),
}
