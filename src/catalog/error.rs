use std::path::PathBuf;

use thiserror::Error;

use crate::types::SourcePosition;

/// Errors raised while reading or writing a catalogue file.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Error when failing to read or write a catalogue file
    #[error("Failed to access catalogue file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML
    #[error("Malformed XML at {position}: {message}")]
    Xml { position: SourcePosition, message: String },

    /// The root element is not `TS`
    #[error("Unexpected root element <{found}> at {position}, expected <TS>")]
    UnexpectedRoot { found: String, position: SourcePosition },

    /// A required child element is missing
    #[error("Missing <{element}> in <{parent}> at {position}")]
    MissingElement { element: &'static str, parent: &'static str, position: SourcePosition },

    /// An attribute carries a value outside its vocabulary
    #[error("Invalid value '{value}' for attribute '{attribute}' at {position}")]
    InvalidAttribute { attribute: &'static str, value: String, position: SourcePosition },

    /// The document ended before the root element was closed
    #[error("Unexpected end of document inside <{element}>")]
    UnexpectedEof { element: String },
}
