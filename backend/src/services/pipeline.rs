//! Program pipeline orchestration.
//!
//! [`ProgramBuilder`] wires the submission store, allocator, assembler,
//! renderer, compiler and booklet merger together. Each run works on its own
//! copies of the request and the store's presentations; nothing is shared
//! between concurrent runs except the store and compiler handles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ProgramConfig;
use crate::db::SubmissionStore;
use crate::error::{ProgramError, ProgramResult};
use crate::models::{
    EventId, PresentationOrderEntry, ProgramDocument, ProgramMetadata, ScheduleAssignment,
    ScheduleDocument, TimeWindow,
};
use crate::services::allocator::allocate;
use crate::services::assembler::assemble;
use crate::services::booklet::{merge_booklet, Booklet, BookletSource};
use crate::services::compiler::{DocumentCompiler, PlatexCompiler};
use crate::services::renderer::render_program;

/// A request to build the program of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRequest {
    pub event: EventId,
    pub metadata: ProgramMetadata,
    /// Slot length; the configured default applies when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_duration_minutes: Option<u32>,
    pub sessions: Vec<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProgramRequest {
    pub fn new(event: EventId, metadata: ProgramMetadata, sessions: Vec<TimeWindow>) -> Self {
        Self {
            event,
            metadata,
            presentation_duration_minutes: None,
            sessions,
            title: None,
            description: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.presentation_duration_minutes = Some(minutes);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Program title, falling back to the event name.
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(self.metadata.event_name.as_str())
    }
}

/// Everything up to and including the markup.
#[derive(Debug, Clone)]
pub struct ProgramPlan {
    pub assignment: ScheduleAssignment,
    pub document: ScheduleDocument,
    pub presentation_order: Vec<PresentationOrderEntry>,
    pub markup: String,
}

/// A plan together with its compiled program.
#[derive(Debug, Clone)]
pub struct ProgramOutcome {
    pub plan: ProgramPlan,
    pub program: ProgramDocument,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ProgramBuilder {
    store: Arc<dyn SubmissionStore>,
    compiler: Arc<dyn DocumentCompiler>,
    config: ProgramConfig,
}

impl ProgramBuilder {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        compiler: Arc<dyn DocumentCompiler>,
        config: ProgramConfig,
    ) -> Self {
        Self {
            store,
            compiler,
            config,
        }
    }

    /// Builder compiling with the `platex` toolchain named in `config`.
    pub fn with_platex(store: Arc<dyn SubmissionStore>, config: ProgramConfig) -> Self {
        let compiler = Arc::new(PlatexCompiler::new(config.compiler.clone()));
        Self::new(store, compiler, config)
    }

    fn presentation_minutes(&self, request: &ProgramRequest) -> ProgramResult<u32> {
        let minutes = request
            .presentation_duration_minutes
            .unwrap_or(self.config.schedule.default_presentation_minutes);
        if minutes == 0 {
            return Err(ProgramError::InvalidPresentationDuration { minutes });
        }
        Ok(minutes)
    }

    /// Allocate, assemble and render without compiling.
    pub async fn plan(&self, request: &ProgramRequest) -> ProgramResult<ProgramPlan> {
        let minutes = self.presentation_minutes(request)?;

        let presentations = self.store.list_presentations(request.event).await?;
        if presentations.is_empty() {
            return Err(ProgramError::NoSubmissions {
                event: request.event.to_string(),
            });
        }
        info!(
            "Planning program '{}' for event {}: {} presentations, {}-minute slots",
            request.title(),
            request.event,
            presentations.len(),
            minutes
        );

        let assignment = allocate(&request.sessions, presentations, minutes)?;
        let assembled = assemble(
            request.metadata.clone(),
            &request.sessions,
            assignment.clone(),
        )?;
        let markup = render_program(&assembled.document);

        Ok(ProgramPlan {
            assignment,
            document: assembled.document,
            presentation_order: assembled.presentation_order,
            markup,
        })
    }

    /// Plan and compile the program.
    pub async fn build(&self, request: &ProgramRequest) -> ProgramResult<ProgramOutcome> {
        let plan = self.plan(request).await?;
        let bytes = self.compiler.compile(&plan.markup).await?;
        let program = ProgramDocument::program(bytes);

        info!(
            "Built program for event {} ({} bytes)",
            request.event,
            program.size()
        );

        Ok(ProgramOutcome {
            plan,
            program,
            generated_at: Utc::now(),
        })
    }

    /// Merge the compiled program with every presenter's source document.
    ///
    /// Source documents are fetched from the store; the merge itself runs on
    /// a blocking worker.
    pub async fn build_booklet(
        &self,
        program: &ProgramDocument,
        order: &[PresentationOrderEntry],
        title: &str,
    ) -> ProgramResult<Booklet> {
        if order.is_empty() {
            return Err(ProgramError::EmptyPresentationOrder);
        }

        let mut sources = Vec::with_capacity(order.len());
        for entry in order {
            sources.push(BookletSource {
                global_order: entry.global_order,
                submission_id: entry.submission_id,
                document: self.store.fetch_source_document(entry.submission_id).await?,
            });
        }

        let program_pdf = program.bytes.clone();
        let title = title.to_string();
        tokio::task::spawn_blocking(move || merge_booklet(&program_pdf, sources, &title))
            .await
            .map_err(|e| ProgramError::internal(format!("booklet merge task failed: {}", e)))?
    }
}
