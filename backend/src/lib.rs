//! # Program Builder
//!
//! Conference program pipeline: allocates submitted presentations to the
//! sessions of a day, assembles the printed program, compiles it and merges
//! presenters' documents into a booklet.
//!
//! ## Architecture
//!
//! - [`models`]: presentations, time windows, allocation results and the
//!   structured program document
//! - [`services`]: capacity model, fair rotation allocator, schedule
//!   assembler, LaTeX renderer, compiler adapter, booklet merger and the
//!   orchestrating [`services::ProgramBuilder`]
//! - [`db`]: the submission store seam and its in-memory implementation
//! - [`config`]: TOML and environment configuration
//! - [`api`]: flat re-export of the public types
//!
//! ## Pipeline
//!
//! ```text
//! SubmissionStore → allocate → assemble → render_program → DocumentCompiler
//!                                                              │
//!                                   merge_booklet ◄────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use program_builder::api::*;
//!
//! async fn example(request: ProgramRequest) -> ProgramResult<()> {
//!     let store = Arc::new(LocalSubmissionStore::new());
//!     let builder = ProgramBuilder::with_platex(store, ProgramConfig::load()?);
//!     let outcome = builder.build(&request).await?;
//!     let booklet = builder
//!         .build_booklet(&outcome.program, &outcome.plan.presentation_order, request.title())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{ErrorKind, ProgramError, ProgramResult};
