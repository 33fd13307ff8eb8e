//! Errors from bounded reads.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    /// Above the read ceiling; nothing was read.
    #[error("file is {found} bytes, over the {limit}-byte read ceiling")]
    FileTooLarge { limit: u64, found: u64 },

    /// Directories, sockets and other non-regular files are never read.
    #[error("not a regular file")]
    NotRegularFile,

    #[error(transparent)]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
