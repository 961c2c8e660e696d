//! Pipeline services.
//!
//! Leaves first: capacity model, allocator, assembler, renderer, compiler
//! adapter and booklet merger. [`pipeline::ProgramBuilder`] ties them together.

pub mod allocator;
pub mod assembler;
pub mod booklet;
pub mod capacity;
pub mod compiler;
pub mod pipeline;
pub mod renderer;

pub use allocator::allocate;
pub use assembler::{assemble, AssembledSchedule};
pub use booklet::{merge_booklet, Booklet, BookletReport, BookletSource, SkipReason, SkippedSource};
pub use capacity::{session_capacity, window_minutes};
pub use compiler::{DocumentCompiler, PlatexCompiler};
pub use pipeline::{ProgramBuilder, ProgramOutcome, ProgramPlan, ProgramRequest};
pub use renderer::{escape_latex, render_program, render_sections};
