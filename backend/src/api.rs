//! Public API surface.
//!
//! Consolidates the types a caller needs to build a program: request and
//! result types, the document model, the store and compiler seams, and the
//! error type. All data types derive Serialize/Deserialize where they cross
//! a process boundary.

pub use crate::config::{CompilerSettings, ProgramConfig, ScheduleSettings};
pub use crate::db::{LocalSubmissionStore, SubmissionStore};
pub use crate::error::{ErrorKind, ProgramError, ProgramResult};
pub use crate::models::{
    BreakNode, BreakWindow, ClockTime, EventId, LaboratoryId, OrderingKey, Presentation,
    PresentationOrderEntry, ProgramDocument, ProgramMetadata, ScheduleAssignment,
    ScheduleDocument, ScheduleNode, ScheduledPresentation, SessionAssignment, SessionNode,
    SessionWindow, SubmissionId, TimeWindow, PDF_MEDIA_TYPE, PROGRAM_FILENAME,
};
pub use crate::services::{
    Booklet, BookletReport, DocumentCompiler, PlatexCompiler, ProgramBuilder, ProgramOutcome,
    ProgramPlan, ProgramRequest, SkipReason, SkippedSource,
};
