//! Session capacity model.
//!
//! A session hosts `floor(length / slot)` presentations, never fewer than one.

use crate::error::{ProgramError, ProgramResult};
use crate::models::{ClockTime, SessionWindow};

/// Length of a window in minutes.
///
/// Fails with `InvalidTimeFormat` for a malformed bound and with
/// `InvalidSessionWindow` when the end is not strictly after the start.
pub fn window_minutes(start_time: &str, end_time: &str) -> ProgramResult<u32> {
    let start = ClockTime::parse(start_time)?;
    let end = ClockTime::parse(end_time)?;

    if end <= start {
        return Err(ProgramError::InvalidSessionWindow {
            start: start_time.to_string(),
            end: end_time.to_string(),
        });
    }

    Ok(end.minutes_since_midnight() - start.minutes_since_midnight())
}

/// Number of presentation slots `session` can hold.
pub fn session_capacity(
    session: &SessionWindow,
    presentation_minutes: u32,
) -> ProgramResult<usize> {
    if presentation_minutes == 0 {
        return Err(ProgramError::InvalidPresentationDuration {
            minutes: presentation_minutes,
        });
    }

    let length = window_minutes(&session.start_time, &session.end_time)?;
    Ok(((length / presentation_minutes) as usize).max(1))
}
