use axum::http::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

use super::codes::ErrorCode;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid HTTP status {status} for error code '{code}'")]
    InvalidStatus { code: String, status: u16 },
}

/// HTTP status overrides keyed by public error code.
///
/// Built once during startup, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    codes: HashMap<String, StatusCode>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the suggested status of every catalog error
    pub fn with_catalog() -> Self {
        let mut registry = Self::new();
        for code in ErrorCode::ALL {
            registry.register(code.code(), code.suggested_status());
        }
        registry
    }

    /// Apply `(code, status)` pairs read from configuration
    pub fn extend_overrides(&mut self, overrides: &[(String, u16)]) -> Result<(), RegistryError> {
        for (code, status) in overrides {
            let status =
                StatusCode::from_u16(*status).map_err(|_| RegistryError::InvalidStatus {
                    code: code.clone(),
                    status: *status,
                })?;
            self.register(code.clone(), status);
        }
        Ok(())
    }

    /// Set the status returned for `code`, replacing any earlier one
    pub fn register(&mut self, code: impl Into<String>, status: StatusCode) {
        self.codes.insert(code.into(), status);
    }

    pub fn lookup(&self, code: &str) -> Option<StatusCode> {
        self.codes.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = StatusRegistry::new();
        assert_eq!(registry.lookup("too_young"), None);

        registry.register("too_young", StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            registry.lookup("too_young"),
            Some(StatusCode::UNPROCESSABLE_ENTITY)
        );
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = StatusRegistry::new();
        registry.register("not_found", StatusCode::GONE);
        registry.register("not_found", StatusCode::NOT_FOUND);
        assert_eq!(registry.lookup("not_found"), Some(StatusCode::NOT_FOUND));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_with_catalog() {
        let registry = StatusRegistry::with_catalog();
        assert_eq!(registry.len(), ErrorCode::ALL.len());
        assert_eq!(registry.lookup("not_found"), Some(StatusCode::NOT_FOUND));
        assert_eq!(
            registry.lookup("content_type_not_accepted"),
            Some(StatusCode::UNSUPPORTED_MEDIA_TYPE)
        );
    }

    #[test]
    fn test_extend_overrides() {
        let mut registry = StatusRegistry::with_catalog();
        registry
            .extend_overrides(&[
                ("too_young".to_string(), 422),
                ("not_found".to_string(), 410),
            ])
            .unwrap();
        assert_eq!(registry.lookup("too_young"), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(registry.lookup("not_found"), Some(StatusCode::GONE));
    }

    #[test]
    fn test_extend_overrides_invalid_status() {
        let mut registry = StatusRegistry::new();
        let err = registry
            .extend_overrides(&[("too_young".to_string(), 42)])
            .unwrap_err();
        assert!(err.to_string().contains("too_young"));
    }
}
