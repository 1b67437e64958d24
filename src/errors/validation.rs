use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use super::public::PublicError;

/// Public code of the aggregate itself
pub const VALIDATION_ERROR: &str = "validation_error";

/// Per-field validation failures, keyed by field name.
///
/// Each field holds a public error; the aggregate is public too, with code
/// `validation_error`.
#[derive(Default)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Box<dyn PublicError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`, replacing any earlier one
    pub fn add(&mut self, field: impl Into<String>, err: impl PublicError) {
        self.fields.insert(field.into(), Box::new(err));
    }

    pub fn with(mut self, field: impl Into<String>, err: impl PublicError) -> Self {
        self.add(field, err);
        self
    }

    /// `(field, public code)` pairs, sorted by field name
    pub fn codes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, err)| (field.as_str(), err.public()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when no field failed, otherwise the aggregate as an error
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.codes()).finish()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, (field, err)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {err}")?;
        }
        Ok(())
    }
}

impl StdError for ValidationErrors {}

impl PublicError for ValidationErrors {
    fn public(&self) -> &str {
        VALIDATION_ERROR
    }
}

/// Query whether `err` is a field-keyed validation aggregate.
pub fn as_validation<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ValidationErrors> {
    err.downcast_ref::<ValidationErrors>()
}
