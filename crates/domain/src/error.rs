/// Shared error type used across the cronlint crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    /// A job source (crontab file, stdin, user crontab) could not be read.
    #[error("{source_name}: {message}")]
    Source {
        source_name: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
