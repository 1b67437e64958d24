use std::error::Error as StdError;
use std::fmt;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Annotates errors with a fixed package prefix.
#[derive(Debug, Clone, Copy)]
pub struct Wrapper {
    prefix: &'static str,
}

impl Wrapper {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    pub fn wrap(&self, err: impl Into<BoxError>, context: impl Into<String>) -> Wrapped {
        Wrapped {
            prefix: self.prefix,
            context: context.into(),
            source: err.into(),
        }
    }
}

/// Error annotated with context; the original stays reachable through `source()`.
///
/// A wrapped error is opaque to the response renderer even when the wrapped one
/// is public.
#[derive(Debug)]
pub struct Wrapped {
    prefix: &'static str,
    context: String,
    source: BoxError,
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.prefix, self.context, self.source)
    }
}

impl StdError for Wrapped {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}
