//! Submission storage.
//!
//! The pipeline reads presentations and presenters' source documents through
//! the [`SubmissionStore`] trait so storage backends can be swapped. The
//! crate ships an in-memory implementation, [`LocalSubmissionStore`], which
//! can be seeded from a JSON manifest.

pub mod local;
pub mod store;

pub use local::LocalSubmissionStore;
pub use store::SubmissionStore;
