//! Submission store trait.

use async_trait::async_trait;

use crate::error::ProgramResult;
use crate::models::{EventId, Presentation, SubmissionId};

/// Read access to the presentations submitted for an event.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Presentations of `event` in submission order.
    ///
    /// Submission order is significant: it defines the order in which
    /// laboratories are first seen by the allocator.
    ///
    /// # Returns
    /// * `Ok(Vec<Presentation>)` - possibly empty
    /// * `Err(ProgramError::NotFound)` - if the event is unknown
    async fn list_presentations(&self, event: EventId) -> ProgramResult<Vec<Presentation>>;

    /// The presenter's own compiled document, if one was uploaded.
    async fn fetch_source_document(
        &self,
        submission: SubmissionId,
    ) -> ProgramResult<Option<Vec<u8>>>;
}
