use std::fmt;

/// Result type alias for the documentation pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the documentation pipeline
#[derive(Debug)]
pub enum Error {
    /// A dispatch handler whose callback does not expose an action map
    UnsupportedHandler { handler: String, path: String },
    /// The route source could not be resolved or parsed
    RouteImport { module: String, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnsupportedHandler { handler, path } => write!(
                f,
                "Unable to use callback for {} at {}: no action map bound to the dispatch handler",
                handler, path
            ),
            Error::RouteImport { module, message } => {
                write!(f, "Failed to import route module {}: {}", module, message)
            }
        }
    }
}

impl std::error::Error for Error {}
