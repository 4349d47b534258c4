use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required node is absent from the game descriptor. Expected to
    /// propagate up to startup failure.
    #[error("failed to find \"{path}\" node in game descriptor")]
    MissingGameNode { path: String },

    #[error("{context}: {message}")]
    Parse { context: String, message: String },

    #[error("invalid filter pattern \"{pattern}\"")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Error {
        Error::Parse {
            context: context.into(),
            message: message.into(),
        }
    }
}
