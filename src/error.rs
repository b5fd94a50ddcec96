//! Error types for the cache registry
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Boxed error returned by a fallible setup callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Registry Error Enum ==
/// Unified error type for the cache registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The one-time setup callback for a new entry failed.
    ///
    /// No entry was inserted; the next access retries construction and setup.
    #[error("Setup failed for cache type {cache_type}: {source}")]
    Setup {
        /// Name of the cache payload type being initialized
        cache_type: &'static str,
        /// Error reported by the setup callback
        #[source]
        source: BoxError,
    },
}

impl RegistryError {
    // == Setup Error ==
    /// Wraps a setup failure for cache type `T`.
    pub fn setup<T>(source: impl Into<BoxError>) -> Self {
        RegistryError::Setup {
            cache_type: std::any::type_name::<T>(),
            source: source.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache registry.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_setup_error_names_cache_type() {
        let err = RegistryError::setup::<u32>("boom");
        let message = err.to_string();

        assert!(message.contains("u32"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_setup_error_exposes_source() {
        let err = RegistryError::setup::<String>(std::io::Error::other("disk"));
        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "disk");
    }
}
