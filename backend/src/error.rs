//! Error types for the program pipeline.
//!
//! Every failure the pipeline can surface is a variant of [`ProgramError`].
//! Variants carry the offending value or the counts involved so the rendered
//! message is precise enough to show to the person who configured the event.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::models::LaboratoryId;

/// Result type for pipeline operations.
pub type ProgramResult<T> = Result<T, ProgramError>;

/// Coarse classification of a [`ProgramError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTimeFormat,
    InvalidSessionWindow,
    InvalidPresentationDuration,
    NoPresentationSessions,
    InsufficientCapacity,
    InsufficientLabSupply,
    NoSubmissions,
    EmptyPresentationOrder,
    CompilationFailure,
    CompilationTimeout,
    Document,
    NotFound,
    Configuration,
    Io,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidTimeFormat => "invalid time format",
            Self::InvalidSessionWindow => "invalid session window",
            Self::InvalidPresentationDuration => "invalid presentation duration",
            Self::NoPresentationSessions => "no presentation sessions",
            Self::InsufficientCapacity => "insufficient capacity",
            Self::InsufficientLabSupply => "insufficient per-lab supply",
            Self::NoSubmissions => "no submissions",
            Self::EmptyPresentationOrder => "empty presentation order",
            Self::CompilationFailure => "compilation failure",
            Self::CompilationTimeout => "compilation timeout",
            Self::Document => "document error",
            Self::NotFound => "not found",
            Self::Configuration => "configuration error",
            Self::Io => "i/o error",
            Self::Internal => "internal error",
        };
        f.write_str(label)
    }
}

/// Error type for the allocation, assembly, compilation and merge pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// A wall-clock value was not of the form `HH:MM`.
    #[error("Invalid time format: '{value}' (expected HH:MM)")]
    InvalidTimeFormat { value: String },

    /// A session window whose end is not after its start.
    #[error("Invalid session window: {start}-{end} does not have a positive duration")]
    InvalidSessionWindow { start: String, end: String },

    /// Presentation slots must last at least one minute.
    #[error("Invalid presentation duration: {minutes} minutes (must be positive)")]
    InvalidPresentationDuration { minutes: u32 },

    #[error("No presentation sessions: the window sequence contains only breaks")]
    NoPresentationSessions,

    /// Total slot capacity across all sessions is below the presentation count.
    #[error("Insufficient capacity: {capacity} slots available for {presentations} presentations")]
    InsufficientCapacity {
        capacity: usize,
        presentations: usize,
    },

    /// One session is too short to host a presentation from every laboratory.
    #[error(
        "Insufficient capacity: session at position {window_index} holds {capacity} presentations \
         but {laboratories} laboratories must each present in it"
    )]
    InsufficientSessionCapacity {
        window_index: usize,
        capacity: usize,
        laboratories: usize,
    },

    /// More sessions than the smallest laboratory has presentations.
    #[error(
        "Insufficient per-lab supply: {sessions} sessions but laboratory {laboratory} \
         has only {available} presentations"
    )]
    InsufficientLabSupply {
        sessions: usize,
        laboratory: LaboratoryId,
        available: usize,
    },

    #[error("No submissions registered for event {event}")]
    NoSubmissions { event: String },

    #[error("Program has no presentation order; nothing to merge")]
    EmptyPresentationOrder,

    /// The external compiler exited unsuccessfully or produced nothing.
    #[error("Compilation failed at stage '{stage}': {diagnostics}")]
    CompilationFailure { stage: String, diagnostics: String },

    #[error("Compilation timed out at stage '{stage}' after {}s", .timeout.as_secs())]
    CompilationTimeout { stage: String, timeout: Duration },

    /// PDF parsing or serialization failed for a document the pipeline requires.
    #[error("Document error: {message}")]
    Document { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ProgramError {
    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a document error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTimeFormat { .. } => ErrorKind::InvalidTimeFormat,
            Self::InvalidSessionWindow { .. } => ErrorKind::InvalidSessionWindow,
            Self::InvalidPresentationDuration { .. } => ErrorKind::InvalidPresentationDuration,
            Self::NoPresentationSessions => ErrorKind::NoPresentationSessions,
            Self::InsufficientCapacity { .. } | Self::InsufficientSessionCapacity { .. } => {
                ErrorKind::InsufficientCapacity
            }
            Self::InsufficientLabSupply { .. } => ErrorKind::InsufficientLabSupply,
            Self::NoSubmissions { .. } => ErrorKind::NoSubmissions,
            Self::EmptyPresentationOrder => ErrorKind::EmptyPresentationOrder,
            Self::CompilationFailure { .. } => ErrorKind::CompilationFailure,
            Self::CompilationTimeout { .. } => ErrorKind::CompilationTimeout,
            Self::Document { .. } => ErrorKind::Document,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// True when the error stems from the caller's input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidTimeFormat
                | ErrorKind::InvalidSessionWindow
                | ErrorKind::InvalidPresentationDuration
                | ErrorKind::NoPresentationSessions
                | ErrorKind::InsufficientCapacity
                | ErrorKind::InsufficientLabSupply
                | ErrorKind::NoSubmissions
                | ErrorKind::EmptyPresentationOrder
        )
    }
}
