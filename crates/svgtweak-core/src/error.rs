use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    Usage { message: String },

    #[error("Invalid selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("Unknown option: {key}")]
    UnknownOption { key: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidOption { key: String, value: String },

    #[error("No <{selector}> elements found")]
    NoMatch { selector: String },

    #[error("Index {selector} out of range (0-{})", count.saturating_sub(1))]
    IndexOutOfRange { selector: String, count: usize },

    #[error("Could not find <svg> root element")]
    NoSvgRoot,

    #[error("Overlapping edits in one batch (at offset {offset})")]
    OverlappingEdits { offset: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn invalid_option(key: &str, value: &str) -> Self {
        Self::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
