//! Time windows making up the day: presentation sessions interleaved with breaks.

use serde::{Deserialize, Serialize};

/// A window that hosts presentations.
///
/// Times are kept as supplied (`HH:MM`) and parsed when capacity is derived,
/// so a malformed value is reported against the session that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWindow {
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chair: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timekeeper: Option<String>,
}

impl SessionWindow {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            chair: None,
            timekeeper: None,
        }
    }

    pub fn with_chair(mut self, chair: impl Into<String>) -> Self {
        self.chair = Some(chair.into());
        self
    }

    pub fn with_timekeeper(mut self, timekeeper: impl Into<String>) -> Self {
        self.timekeeper = Some(timekeeper.into());
        self
    }
}

/// A window rendered in the program but never allocated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakWindow {
    pub start_time: String,
    pub end_time: String,
}

impl BreakWindow {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// One entry of the ordered window sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimeWindow {
    Session(SessionWindow),
    Break(BreakWindow),
}

impl TimeWindow {
    pub fn session(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self::Session(SessionWindow::new(start_time, end_time))
    }

    pub fn break_window(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self::Break(BreakWindow::new(start_time, end_time))
    }

    pub fn start_time(&self) -> &str {
        match self {
            Self::Session(s) => &s.start_time,
            Self::Break(b) => &b.start_time,
        }
    }

    pub fn end_time(&self) -> &str {
        match self {
            Self::Session(s) => &s.end_time,
            Self::Break(b) => &b.end_time,
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }

    pub fn as_session(&self) -> Option<&SessionWindow> {
        match self {
            Self::Session(s) => Some(s),
            Self::Break(_) => None,
        }
    }
}

impl From<SessionWindow> for TimeWindow {
    fn from(session: SessionWindow) -> Self {
        Self::Session(session)
    }
}

impl From<BreakWindow> for TimeWindow {
    fn from(window: BreakWindow) -> Self {
        Self::Break(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_payload() {
        let json = r#"[
            {"type": "session", "startTime": "09:00", "endTime": "10:00", "chair": "Kuroki", "timekeeper": "Ono"},
            {"type": "break", "startTime": "10:00", "endTime": "10:15"},
            {"type": "session", "startTime": "10:15", "endTime": "11:15"}
        ]"#;
        let windows: Vec<TimeWindow> = serde_json::from_str(json).unwrap();
        assert_eq!(windows.len(), 3);
        let first = windows[0].as_session().unwrap();
        assert_eq!(first.chair.as_deref(), Some("Kuroki"));
        assert_eq!(first.timekeeper.as_deref(), Some("Ono"));
        assert!(!windows[1].is_session());
        assert_eq!(windows[1].start_time(), "10:00");
        assert_eq!(windows[2].as_session().unwrap().chair, None);
    }

    #[test]
    fn test_rejects_unknown_type() {
        let json = r#"{"type": "lunch", "startTime": "12:00", "endTime": "13:00"}"#;
        assert!(serde_json::from_str::<TimeWindow>(json).is_err());
    }

    #[test]
    fn test_serialize_round_trip_tag() {
        let window = TimeWindow::break_window("12:00", "13:00");
        let value = serde_json::to_value(&window).unwrap();
        assert_eq!(value["type"], "break");
        assert_eq!(value["endTime"], "13:00");
    }
}
