//! Allocation results and the structured program they are assembled into.

use serde::{Deserialize, Serialize};

use super::presentation::{LaboratoryId, OrderingKey, Presentation, SubmissionId};
use super::window::SessionWindow;

// ============================================================================
// Allocation
// ============================================================================

/// Presentations allocated to one session window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAssignment {
    /// Position of the session in the full window sequence (breaks included).
    pub window_index: usize,
    /// Slot count derived for the window.
    pub capacity: usize,
    /// Assigned presentations, ascending by ordering key.
    pub presentations: Vec<Presentation>,
}

impl SessionAssignment {
    pub fn len(&self) -> usize {
        self.presentations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presentations.is_empty()
    }
}

/// Output of the allocator: one list per session window, in window order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    sessions: Vec<SessionAssignment>,
}

impl ScheduleAssignment {
    pub fn new(sessions: Vec<SessionAssignment>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[SessionAssignment] {
        &self.sessions
    }

    pub fn into_sessions(self) -> Vec<SessionAssignment> {
        self.sessions
    }

    /// Number of presentations placed across every session.
    pub fn total_assigned(&self) -> usize {
        self.sessions.iter().map(SessionAssignment::len).sum()
    }

    /// Total slot count across every session.
    pub fn total_capacity(&self) -> usize {
        self.sessions.iter().map(|s| s.capacity).sum()
    }
}

// ============================================================================
// Presentation order ledger
// ============================================================================

/// One row of the schedule-wide presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOrderEntry {
    pub submission_id: SubmissionId,
    pub ordering_key: OrderingKey,
    pub display_name: String,
    pub laboratory: String,
    pub laboratory_id: LaboratoryId,
    pub theme: String,
    /// Index of the hosting session in the full window sequence.
    pub session_index: usize,
    pub session_start_time: String,
    pub session_end_time: String,
    /// 1-based, restarts for every session.
    pub order_in_session: u32,
    /// 1-based, contiguous across the whole schedule.
    pub global_order: u32,
}

// ============================================================================
// Program document model
// ============================================================================

/// Title block of the printed program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramMetadata {
    pub course_name: String,
    pub event_name: String,
    pub event_theme: String,
    pub date_time: String,
    pub venue: String,
}

/// A presentation resolved into a session node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPresentation {
    pub id: SubmissionId,
    /// Ordering key read as an integer, `0` when not numeric.
    pub student_number: i64,
    pub laboratory_id: LaboratoryId,
    pub display_name: String,
    pub theme: String,
}

impl From<&Presentation> for ScheduledPresentation {
    fn from(p: &Presentation) -> Self {
        Self {
            id: p.id,
            student_number: p.ordering_key.numeric_or_zero(),
            laboratory_id: p.laboratory_id,
            display_name: p.display_name.clone(),
            theme: p.theme.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNode {
    pub start_time: String,
    pub end_time: String,
    pub chair: Option<String>,
    pub timekeeper: Option<String>,
    pub presentations: Vec<ScheduledPresentation>,
}

impl SessionNode {
    /// Node for `window` with no presentations yet.
    pub fn from_window(window: &SessionWindow) -> Self {
        Self {
            start_time: window.start_time.clone(),
            end_time: window.end_time.clone(),
            chair: window.chair.clone(),
            timekeeper: window.timekeeper.clone(),
            presentations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakNode {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScheduleNode {
    Session(SessionNode),
    Break(BreakNode),
}

/// Structured program: title block plus window nodes in original order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub metadata: ProgramMetadata,
    pub nodes: Vec<ScheduleNode>,
}

impl ScheduleDocument {
    pub fn session_nodes(&self) -> impl Iterator<Item = &SessionNode> {
        self.nodes.iter().filter_map(|node| match node {
            ScheduleNode::Session(s) => Some(s),
            ScheduleNode::Break(_) => None,
        })
    }

    pub fn presentation_count(&self) -> usize {
        self.session_nodes().map(|s| s.presentations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_totals() {
        let lab = LaboratoryId::new(1);
        let assignment = ScheduleAssignment::new(vec![
            SessionAssignment {
                window_index: 0,
                capacity: 4,
                presentations: vec![
                    Presentation::new(lab, "1", "A", "x"),
                    Presentation::new(lab, "2", "B", "y"),
                ],
            },
            SessionAssignment {
                window_index: 2,
                capacity: 3,
                presentations: vec![Presentation::new(lab, "3", "C", "z")],
            },
        ]);
        assert_eq!(assignment.total_assigned(), 3);
        assert_eq!(assignment.total_capacity(), 7);
        assert_eq!(assignment.sessions()[1].window_index, 2);
    }

    #[test]
    fn test_scheduled_presentation_numeric_fallback() {
        let p = Presentation::new(LaboratoryId::new(2), "S-17", "Name", "Theme");
        let scheduled = ScheduledPresentation::from(&p);
        assert_eq!(scheduled.student_number, 0);
        assert_eq!(scheduled.laboratory_id, LaboratoryId::new(2));
    }

    #[test]
    fn test_node_serialization_tags() {
        let node = ScheduleNode::Break(BreakNode {
            start_time: "10:00".into(),
            end_time: "10:10".into(),
        });
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "break");
        assert_eq!(value["startTime"], "10:00");
    }

    #[test]
    fn test_metadata_camel_case() {
        let json = r#"{"courseName":"C","eventName":"E","eventTheme":"T","dateTime":"D","venue":"V"}"#;
        let meta: ProgramMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.event_name, "E");
        assert_eq!(meta.date_time, "D");
    }
}
