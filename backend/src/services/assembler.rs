//! Schedule assembler.
//!
//! Walks the window sequence once, emitting break nodes untouched and
//! attaching the next session assignment to each session window. The running
//! presentation counter is threaded through an explicit accumulator so the
//! walk stays a pure function of its inputs.

use log::debug;

use crate::error::{ProgramError, ProgramResult};
use crate::models::{
    BreakNode, BreakWindow, PresentationOrderEntry, ProgramMetadata, ScheduleAssignment,
    ScheduleDocument, ScheduleNode, ScheduledPresentation, SessionAssignment, SessionNode,
    SessionWindow, TimeWindow,
};

/// Document model plus the flat presentation order ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSchedule {
    pub document: ScheduleDocument,
    pub presentation_order: Vec<PresentationOrderEntry>,
}

/// State carried from one window to the next.
struct Accumulator {
    next_global_order: u32,
    nodes: Vec<ScheduleNode>,
    order: Vec<PresentationOrderEntry>,
}

impl Accumulator {
    fn new(window_count: usize) -> Self {
        Self {
            next_global_order: 1,
            nodes: Vec::with_capacity(window_count),
            order: Vec::new(),
        }
    }

    fn push_break(mut self, window: &BreakWindow) -> Self {
        self.nodes.push(ScheduleNode::Break(BreakNode {
            start_time: window.start_time.clone(),
            end_time: window.end_time.clone(),
        }));
        self
    }

    fn push_session(
        mut self,
        window_index: usize,
        window: &SessionWindow,
        assignment: SessionAssignment,
    ) -> Self {
        let mut node = SessionNode::from_window(window);

        for (position, presentation) in assignment.presentations.iter().enumerate() {
            node.presentations.push(ScheduledPresentation::from(presentation));
            self.order.push(PresentationOrderEntry {
                submission_id: presentation.id,
                ordering_key: presentation.ordering_key.clone(),
                display_name: presentation.display_name.clone(),
                laboratory: presentation.laboratory.clone(),
                laboratory_id: presentation.laboratory_id,
                theme: presentation.theme.clone(),
                session_index: window_index,
                session_start_time: window.start_time.clone(),
                session_end_time: window.end_time.clone(),
                order_in_session: position as u32 + 1,
                global_order: self.next_global_order,
            });
            self.next_global_order += 1;
        }

        self.nodes.push(ScheduleNode::Session(node));
        self
    }

    /// Append one window, taking the next assignment for a session window.
    fn push_window(
        self,
        window_index: usize,
        window: &TimeWindow,
        pending: &mut impl Iterator<Item = SessionAssignment>,
    ) -> ProgramResult<Self> {
        let session = match window {
            TimeWindow::Break(b) => return Ok(self.push_break(b)),
            TimeWindow::Session(s) => s,
        };

        let next = pending
            .next()
            .ok_or_else(|| ProgramError::internal("assignment exhausted early"))?;
        if next.window_index != window_index {
            return Err(ProgramError::internal(format!(
                "assignment for window {} offered to window {}",
                next.window_index, window_index
            )));
        }
        Ok(self.push_session(window_index, session, next))
    }
}

/// Assemble `assignment` into the window sequence it was allocated from.
///
/// Fails when the assignment does not line up with the session windows of
/// `windows` (wrong count or wrong positions).
pub fn assemble(
    metadata: ProgramMetadata,
    windows: &[TimeWindow],
    assignment: ScheduleAssignment,
) -> ProgramResult<AssembledSchedule> {
    let session_windows = windows.iter().filter(|w| w.is_session()).count();
    if assignment.sessions().len() != session_windows {
        return Err(ProgramError::internal(format!(
            "assignment has {} sessions but the window sequence has {}",
            assignment.sessions().len(),
            session_windows
        )));
    }

    let mut pending = assignment.into_sessions().into_iter();

    let acc = windows
        .iter()
        .enumerate()
        .try_fold(Accumulator::new(windows.len()), |acc, (index, window)| {
            acc.push_window(index, window, &mut pending)
        })?;

    debug!(
        "Assembled {} windows with {} presentations",
        acc.nodes.len(),
        acc.order.len()
    );

    Ok(AssembledSchedule {
        document: ScheduleDocument {
            metadata,
            nodes: acc.nodes,
        },
        presentation_order: acc.order,
    })
}
