// interpolation.rs
//
// Planar linear interpolation along the route polyline. At a few kilometres
// the error against a great-circle path is negligible.

use crate::error::SimulationError;
use crate::shared_data::Waypoint;

/// Where a progress value falls on the polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPosition {
    pub segment_index: usize,
    pub next_index: usize,
    /// Fraction of the way through the segment, in [0, 1).
    pub local_t: f64,
}

/// Maps `progress` in [0, 1) onto a segment of a route with `waypoint_count` points.
pub fn locate_segment(
    progress: f64,
    waypoint_count: usize,
) -> Result<SegmentPosition, SimulationError> {
    if waypoint_count == 0 {
        return Err(SimulationError::EmptyRoute);
    }
    if waypoint_count < 2 {
        return Err(SimulationError::TooFewWaypoints(waypoint_count));
    }

    let last = waypoint_count - 1;
    let scaled = progress.clamp(0.0, 1.0) * last as f64;
    let segment_index = (scaled.floor() as usize).min(last);
    let next_index = (segment_index + 1).min(last);

    Ok(SegmentPosition {
        segment_index,
        next_index,
        local_t: scaled - segment_index as f64,
    })
}

/// Returns the bus position for `progress`, blending the two waypoints that
/// bound its segment.
pub fn interpolate_position(
    waypoints: &[Waypoint],
    progress: f64,
) -> Result<Waypoint, SimulationError> {
    if !progress.is_finite() {
        return Err(SimulationError::NonFiniteProgress(progress));
    }
    let segment = locate_segment(progress, waypoints.len())?;
    let from = waypoints[segment.segment_index];
    let to = waypoints[segment.next_index];
    if !from.is_finite() {
        return Err(SimulationError::NonFiniteCoordinate {
            index: segment.segment_index,
        });
    }
    if !to.is_finite() {
        return Err(SimulationError::NonFiniteCoordinate {
            index: segment.next_index,
        });
    }

    Ok(Waypoint {
        latitude: from.latitude + (to.latitude - from.latitude) * segment.local_t,
        longitude: from.longitude + (to.longitude - from.longitude) * segment.local_t,
    })
}
