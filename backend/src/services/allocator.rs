//! Fair rotation allocator.
//!
//! Distributes presentations across the session windows of a day so that
//! every laboratory presents in every session, then tops sessions up in
//! ordering-key order until all presentations are placed.
//!
//! The run is a fixed sequence of fallible stages:
//!
//! 1. [`presentation_sessions`]: the non-break windows (at least one)
//! 2. [`group_by_laboratory`]: per-lab queues in first-seen lab order
//! 3. [`session_capacities`] + [`check_total_capacity`]
//! 4. [`check_lab_supply`]: every lab can supply one presentation per session
//! 5. [`check_session_fit`]: every session fits one presentation per lab
//! 6. round-robin pass, fill pass, final sort
//!
//! Any failing stage aborts the run; no partial assignment is ever returned.

use std::collections::VecDeque;

use log::debug;

use crate::error::{ProgramError, ProgramResult};
use crate::models::{
    LaboratoryId, Presentation, ScheduleAssignment, SessionAssignment, SessionWindow, TimeWindow,
};
use crate::services::capacity::session_capacity;

/// A session window together with its position in the full window sequence.
#[derive(Debug, Clone, Copy)]
pub struct PresentationSession<'a> {
    pub window_index: usize,
    pub window: &'a SessionWindow,
}

/// Presentations of one laboratory, lowest ordering key first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabGroup {
    pub laboratory_id: LaboratoryId,
    queue: VecDeque<Presentation>,
}

impl LabGroup {
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn presentations(&self) -> impl Iterator<Item = &Presentation> {
        self.queue.iter()
    }

    fn pop_lowest(&mut self) -> Option<Presentation> {
        self.queue.pop_front()
    }
}

/// Session windows of `windows`, breaks skipped.
pub fn presentation_sessions(
    windows: &[TimeWindow],
) -> ProgramResult<Vec<PresentationSession<'_>>> {
    let sessions: Vec<_> = windows
        .iter()
        .enumerate()
        .filter_map(|(window_index, window)| {
            window.as_session().map(|window| PresentationSession {
                window_index,
                window,
            })
        })
        .collect();

    if sessions.is_empty() {
        return Err(ProgramError::NoPresentationSessions);
    }
    Ok(sessions)
}

/// Group presentations by laboratory.
///
/// Groups appear in the order their laboratory is first seen in the input;
/// each group is sorted ascending by ordering key (stable for equal keys).
pub fn group_by_laboratory(presentations: Vec<Presentation>) -> Vec<LabGroup> {
    let mut groups: Vec<(LaboratoryId, Vec<Presentation>)> = Vec::new();

    for presentation in presentations {
        match groups
            .iter_mut()
            .find(|(lab, _)| *lab == presentation.laboratory_id)
        {
            Some((_, members)) => members.push(presentation),
            None => groups.push((presentation.laboratory_id, vec![presentation])),
        }
    }

    groups
        .into_iter()
        .map(|(laboratory_id, mut members)| {
            members.sort_by(|a, b| a.ordering_key.cmp(&b.ordering_key));
            LabGroup {
                laboratory_id,
                queue: members.into(),
            }
        })
        .collect()
}

/// Slot count of each session, in session order.
pub fn session_capacities(
    sessions: &[PresentationSession<'_>],
    presentation_minutes: u32,
) -> ProgramResult<Vec<usize>> {
    sessions
        .iter()
        .map(|s| session_capacity(s.window, presentation_minutes))
        .collect()
}

pub fn check_total_capacity(capacities: &[usize], presentations: usize) -> ProgramResult<()> {
    let capacity: usize = capacities.iter().sum();
    if capacity < presentations {
        return Err(ProgramError::InsufficientCapacity {
            capacity,
            presentations,
        });
    }
    Ok(())
}

/// Every laboratory must have at least one presentation per session.
pub fn check_lab_supply(session_count: usize, groups: &[LabGroup]) -> ProgramResult<()> {
    let Some(smallest) = groups.iter().min_by_key(|g| g.len()) else {
        return Ok(());
    };

    if session_count > smallest.len() {
        return Err(ProgramError::InsufficientLabSupply {
            sessions: session_count,
            laboratory: smallest.laboratory_id,
            available: smallest.len(),
        });
    }
    Ok(())
}

/// Every session must have room for one presentation from each laboratory.
pub fn check_session_fit(
    sessions: &[PresentationSession<'_>],
    capacities: &[usize],
    laboratories: usize,
) -> ProgramResult<()> {
    for (session, &capacity) in sessions.iter().zip(capacities) {
        if capacity < laboratories {
            return Err(ProgramError::InsufficientSessionCapacity {
                window_index: session.window_index,
                capacity,
                laboratories,
            });
        }
    }
    Ok(())
}

/// Allocate `presentations` to the session windows of `windows`.
pub fn allocate(
    windows: &[TimeWindow],
    presentations: Vec<Presentation>,
    presentation_minutes: u32,
) -> ProgramResult<ScheduleAssignment> {
    let total = presentations.len();

    let sessions = presentation_sessions(windows)?;
    let mut groups = group_by_laboratory(presentations);
    let capacities = session_capacities(&sessions, presentation_minutes)?;
    check_total_capacity(&capacities, total)?;
    check_lab_supply(sessions.len(), &groups)?;
    check_session_fit(&sessions, &capacities, groups.len())?;

    debug!(
        "Allocating {} presentations from {} laboratories across {} sessions (capacities {:?})",
        total,
        groups.len(),
        sessions.len(),
        capacities
    );

    let mut assigned = round_robin(&mut groups, sessions.len());
    let unplaced = fill(&mut assigned, &capacities, groups);
    if unplaced > 0 {
        return Err(ProgramError::InsufficientCapacity {
            capacity: capacities.iter().sum(),
            presentations: total,
        });
    }

    let sessions = sessions
        .iter()
        .zip(capacities)
        .zip(assigned)
        .map(|((session, capacity), mut presentations)| {
            presentations.sort_by(|a, b| a.ordering_key.cmp(&b.ordering_key));
            SessionAssignment {
                window_index: session.window_index,
                capacity,
                presentations,
            }
        })
        .collect();

    Ok(ScheduleAssignment::new(sessions))
}

/// One presentation per non-empty laboratory per session, sessions in order.
fn round_robin(groups: &mut [LabGroup], session_count: usize) -> Vec<Vec<Presentation>> {
    (0..session_count)
        .map(|_| groups.iter_mut().filter_map(LabGroup::pop_lowest).collect())
        .collect()
}

/// Top sessions up to capacity from the leftover pool, lowest key first.
///
/// Returns the number of presentations that found no room.
fn fill(assigned: &mut [Vec<Presentation>], capacities: &[usize], groups: Vec<LabGroup>) -> usize {
    let mut remaining: Vec<Presentation> = groups.into_iter().flat_map(|g| g.queue).collect();
    remaining.sort_by(|a, b| a.ordering_key.cmp(&b.ordering_key));
    let mut remaining = VecDeque::from(remaining);

    for (session, &capacity) in assigned.iter_mut().zip(capacities) {
        while session.len() < capacity {
            match remaining.pop_front() {
                Some(presentation) => session.push(presentation),
                None => return 0,
            }
        }
    }
    remaining.len()
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod allocator_tests;
