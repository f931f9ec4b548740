use thiserror::Error;

/// Errors from validating [`Options`](crate::Options).
/// Aligning itself never fails, it falls back to applying the reading to the whole body instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("'{0}' can't be both a separator and a combinator")]
    AmbiguousMarker(char),
    #[error("fallback parentheses must be an opening and a closing character, got {0:?}")]
    FallbackParens(String),
}

pub type Result<T> = std::result::Result<T, Error>;
