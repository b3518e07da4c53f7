//! Common error types used across the workspace.
//!
//! Each layer defines its failures here as typed enums and converts into
//! [`BrewRigError`] via `#[from]`. Conditions that are part of normal
//! operation (a trigger wait skipped over a missing precondition, a
//! cancelled sleep) are modelled as data in the owning module, not as
//! errors.

/// Top-level error for brewrig operations.
#[derive(Debug, thiserror::Error)]
pub enum BrewRigError {
    /// A trigger parameter bag could not be parsed.
    #[error("invalid trigger parameters")]
    Parse(#[from] ParseError),
    /// A time-series file could not be written.
    #[error("persistence failure")]
    Persistence(#[from] PersistenceError),
    /// A domain invariant was violated.
    #[error("validation failed")]
    Validation(#[from] ValidationError),
    /// The rig could not report its own state.
    #[error("status source failure")]
    Status(#[from] StatusSourceError),
}

/// Malformed or missing fields in a trigger parameter bag.
///
/// Surfaced to whoever is editing the recipe; the edit is rejected and the
/// trigger keeps its previous configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A required field was absent from the parameter bag.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A numeric field could not be parsed as a decimal.
    #[error("field `{field}` is not a valid number: `{value}`")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },
}

/// A time-series file or directory could not be created or written.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Create/open/append/close failure on a log or series file.
    #[error("could not write to {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A snapshot could not be serialized for the raw log.
    #[error("could not serialize snapshot")]
    Serialize(#[from] serde_json::Error),
    /// A write was attempted before a recording run was opened.
    #[error("no recording run is active")]
    NoActiveRun,
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Trigger positions are a total order key and must be unique.
    #[error("a trigger already exists at position {0}")]
    DuplicatePosition(i32),
    /// Names of timers and vessels must not be empty.
    #[error("name must not be empty")]
    EmptyName,
}

/// The rig could not produce a status snapshot.
///
/// Fatal to the sampling loop: when the rig cannot report its own state
/// there is nothing meaningful left to record.
#[derive(Debug, thiserror::Error)]
#[error("status source failed: {0}")]
pub struct StatusSourceError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_missing_field_with_field_name() {
        let err = ParseError::MissingField("targetTemperature");
        assert_eq!(
            err.to_string(),
            "missing required field `targetTemperature`"
        );
    }

    #[test]
    fn should_render_invalid_number_with_offending_value() {
        let err = ParseError::InvalidNumber {
            field: "exitTemperature",
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "field `exitTemperature` is not a valid number: `abc`"
        );
    }

    #[test]
    fn should_wrap_parse_error_into_top_level_error() {
        let err: BrewRigError = ParseError::MissingField("mode").into();
        assert!(matches!(err, BrewRigError::Parse(_)));
    }

    #[test]
    fn should_keep_io_source_on_persistence_error() {
        let err = PersistenceError::Io {
            path: "graph-data/raw.log".to_string(),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(err.to_string(), "could not write to graph-data/raw.log");
        assert!(std::error::Error::source(&err).is_some());
    }
}
