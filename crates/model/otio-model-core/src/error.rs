//! Error types for the timeline model

use std::fmt;

use otio_time_core::TimeError;
use serde::{Deserialize, Serialize};

/// Status kind carried by every [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    JsonParseError,
    InvalidTimecodeString,
    InvalidTimeString,
    InvalidTimecodeRate,
    NonDropframeRate,
    TimecodeRateMismatch,
    NegativeValue,

    MalformedSchema,
    SchemaAlreadyRegistered,
    SchemaNotRegistered,
    SchemaVersionUnsupported,
    UnresolvedObjectReference,
    DuplicateObjectReference,

    ChildAlreadyParented,
    NotAnItem,
    NotAChildOf,
    NotAChild,
    NotDescendedFrom,
    IllegalIndex,
    KeyNotFound,
    TypeMismatch,

    NotImplemented,
    CannotComputeAvailableRange,
    InvalidTimeRange,
    InvalidTimeRate,
    ObjectWithoutDuration,
    CannotTrimTransition,

    FileOpenFailed,
    FileWriteFailed,

    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonParseError => "JSON parse error",
            Self::InvalidTimecodeString => "invalid timecode string",
            Self::InvalidTimeString => "invalid time string",
            Self::InvalidTimecodeRate => "invalid timecode rate",
            Self::NonDropframeRate => "rate is not a drop-frame rate",
            Self::TimecodeRateMismatch => "timecode does not match rate",
            Self::NegativeValue => "negative value",
            Self::MalformedSchema => "malformed schema",
            Self::SchemaAlreadyRegistered => "schema already registered",
            Self::SchemaNotRegistered => "schema not registered",
            Self::SchemaVersionUnsupported => "unsupported schema version",
            Self::UnresolvedObjectReference => "unresolved object reference",
            Self::DuplicateObjectReference => "duplicate object reference",
            Self::ChildAlreadyParented => "child already has a parent",
            Self::NotAnItem => "object is not an item",
            Self::NotAChildOf => "object is not a child of this composition",
            Self::NotAChild => "object has no parent",
            Self::NotDescendedFrom => "objects do not share an ancestor",
            Self::IllegalIndex => "illegal index",
            Self::KeyNotFound => "key not found",
            Self::TypeMismatch => "type mismatch",
            Self::NotImplemented => "method not implemented for this schema",
            Self::CannotComputeAvailableRange => "cannot compute available range",
            Self::InvalidTimeRange => "invalid time range",
            Self::InvalidTimeRate => "invalid time rate",
            Self::ObjectWithoutDuration => "object has no duration",
            Self::CannotTrimTransition => "cannot trim transition",
            Self::FileOpenFailed => "file open failed",
            Self::FileWriteFailed => "file write failed",
            Self::InternalError => "internal error",
        }
    }

    /// Grouping used for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::JsonParseError
            | Self::InvalidTimecodeString
            | Self::InvalidTimeString
            | Self::InvalidTimecodeRate
            | Self::NonDropframeRate
            | Self::TimecodeRateMismatch
            | Self::NegativeValue => "parse",
            Self::MalformedSchema
            | Self::SchemaAlreadyRegistered
            | Self::SchemaNotRegistered
            | Self::SchemaVersionUnsupported
            | Self::UnresolvedObjectReference
            | Self::DuplicateObjectReference => "schema",
            Self::ChildAlreadyParented
            | Self::NotAnItem
            | Self::NotAChildOf
            | Self::NotAChild
            | Self::NotDescendedFrom
            | Self::IllegalIndex
            | Self::KeyNotFound
            | Self::TypeMismatch => "tree",
            Self::NotImplemented
            | Self::CannotComputeAvailableRange
            | Self::InvalidTimeRange
            | Self::InvalidTimeRate
            | Self::ObjectWithoutDuration
            | Self::CannotTrimTransition => "computation",
            Self::FileOpenFailed | Self::FileWriteFailed => "io",
            Self::InternalError => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status kind plus a human-readable detail message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        self.kind.category()
    }

    /// Errors caused by caller input that can be retried with corrected input.
    /// Structural and internal failures are not recoverable.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            "parse" | "io"
        ) || matches!(
            self.kind,
            ErrorKind::IllegalIndex | ErrorKind::KeyNotFound | ErrorKind::SchemaNotRegistered
        )
    }
}

impl From<TimeError> for Error {
    fn from(err: TimeError) -> Self {
        let kind = match &err {
            TimeError::InvalidTimeRate { .. } => ErrorKind::InvalidTimeRate,
            TimeError::InvalidTimecodeRate { .. } => ErrorKind::InvalidTimecodeRate,
            TimeError::NonDropframeRate { .. } => ErrorKind::NonDropframeRate,
            TimeError::InvalidTimecodeString { .. } => ErrorKind::InvalidTimecodeString,
            TimeError::InvalidTimeString { .. } => ErrorKind::InvalidTimeString,
            TimeError::TimecodeRateMismatch { .. } => ErrorKind::TimecodeRateMismatch,
            TimeError::NegativeValue { .. } => ErrorKind::NegativeValue,
            _ => ErrorKind::InternalError,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::JsonParseError, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::new(ErrorKind::IllegalIndex, "index 4 out of range 0..2");
        assert_eq!(err.to_string(), "illegal index: index 4 out of range 0..2");
        assert_eq!(err.kind(), ErrorKind::IllegalIndex);
    }

    #[test]
    fn time_errors_keep_their_kind() {
        let err: Error = TimeError::NonDropframeRate { rate: 24.0 }.into();
        assert_eq!(err.kind(), ErrorKind::NonDropframeRate);
        let err: Error = TimeError::InvalidTimeRate { rate: 0.0 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidTimeRate);
        assert_eq!(err.category(), "computation");
    }

    #[test]
    fn json_errors_map_to_parse_kind() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = bad.into();
        assert_eq!(err.kind(), ErrorKind::JsonParseError);
        assert!(err.is_recoverable());
    }

    #[test]
    fn structural_errors_are_not_recoverable() {
        let err = Error::new(ErrorKind::ChildAlreadyParented, "clip");
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), "tree");
        assert_eq!(ErrorKind::InternalError.category(), "internal");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::CannotTrimTransition).unwrap();
        assert_eq!(json, "\"cannot_trim_transition\"");
    }
}
