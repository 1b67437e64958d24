use std::error::Error as StdError;
use thiserror::Error;

/// Error returned by any layer to request a graceful shutdown of the service.
///
/// Recognised by type only, never by its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Shutdown {
    message: String,
}

impl Shutdown {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Innermost error of the `source()` chain
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

/// Whether the innermost cause of `err` is a [`Shutdown`].
pub fn is_shutdown(err: &(dyn StdError + 'static)) -> bool {
    root_cause(err).is::<Shutdown>()
}
