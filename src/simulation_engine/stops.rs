// stops.rs
//
// Stop status bookkeeping: the completed/current/upcoming ordering and the
// handoff that moves `current` forward once the bus passes a progress mark.

use crate::error::SimulationError;
use crate::global_variables::COMPLETED_LABEL;
use crate::route_data::StopHandoff;
use crate::shared_data::{Stop, StopStatus};

/// Verifies that at most one stop is `current`, every stop before it is
/// `completed` and every stop after it is `upcoming`.
///
/// With no `current` stop the list must still read completed-then-upcoming.
pub fn check_stop_sequence(stops: &[Stop]) -> Result<(), SimulationError> {
    let current: Vec<usize> = stops
        .iter()
        .enumerate()
        .filter(|(_, stop)| stop.status == StopStatus::Current)
        .map(|(index, _)| index)
        .collect();
    if current.len() > 1 {
        return Err(SimulationError::InvalidStopSequence(format!(
            "{} stops are current (indices {:?})",
            current.len(),
            current
        )));
    }

    // Walking forward, status rank may only fall: Completed > Current > Upcoming.
    for pair in stops.windows(2) {
        if pair[1].status > pair[0].status {
            return Err(SimulationError::InvalidStopSequence(format!(
                "'{}' is {} but follows '{}' which is {}",
                pair[1].name, pair[1].status, pair[0].name, pair[0].status
            )));
        }
    }
    Ok(())
}

/// Applies the handoff for this tick.
///
/// Returns the replacement stop list when the handoff fires, `None` when the
/// stops are unchanged. The handoff only fires while `from_stop` is still
/// current, so it happens once per run.
pub fn apply_handoff(
    stops: &[Stop],
    progress: f64,
    eta_minutes: u32,
    handoff: &StopHandoff,
) -> Option<Vec<Stop>> {
    if progress <= handoff.threshold {
        return None;
    }
    let from = stops.get(handoff.from_stop)?;
    if from.status != StopStatus::Current || handoff.to_stop >= stops.len() {
        return None;
    }

    let mut updated = stops.to_vec();
    updated[handoff.from_stop].status = StopStatus::Completed;
    updated[handoff.from_stop].eta_label = COMPLETED_LABEL.to_string();
    updated[handoff.to_stop].status = StopStatus::Current;
    updated[handoff.to_stop].eta_label = format!("{} mins", eta_minutes);
    Some(updated)
}

/// True when no stop moved backwards between two snapshots of the same run.
pub fn is_monotonic_update(before: &[Stop], after: &[Stop]) -> bool {
    before.len() == after.len()
        && before
            .iter()
            .zip(after)
            .all(|(old, new)| new.status >= old.status)
}
