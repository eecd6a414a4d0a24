use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Reasons a conversion is refused. Any error aborts the whole call.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum RenderError {
    #[error("unsupported output syntax: {0:?}")]
    UnsupportedSyntax(String),

    #[error("invalid entity #{index}: offset {offset} and length {length} must be non-negative")]
    InvalidEntity {
        index: usize,
        offset: i32,
        length: i32,
    },
}
