//! Curve normalizer
//!
//! Turns the flattened primitives of a drawing into the single polygon the
//! rest of the engine works on. A closed primitive wins outright; otherwise
//! the open segments are stitched end to end.

use gcodehatch_core::{Point, Polygon, Primitive, Segment, ToolpathError, ToolpathResult};
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of normalizing a drawing's primitives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StitchResult {
    /// The assembled polygon (closed or best-effort partial chain)
    pub polygon: Polygon,
    /// Every segment was consumed and the chain ends where it starts
    pub fully_closed: bool,
    /// Segments that could not be attached to the chain
    pub unconnected: usize,
}

/// How a candidate segment attaches to the working chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    StartToTail,
    EndToTail,
    StartToHead,
    EndToHead,
}

/// Reduce decoded primitives to one polygon.
///
/// The first non-empty closed primitive is returned unchanged and everything
/// else is ignored. Without one, open primitives are stitched with
/// [`stitch_segments`].
pub fn normalize_primitives(
    primitives: Vec<Primitive>,
    tolerance: f64,
) -> ToolpathResult<StitchResult> {
    let total = primitives.len();

    if let Some(index) = primitives
        .iter()
        .position(|p| p.is_closed() && !p.points.is_empty())
    {
        let closed = primitives
            .into_iter()
            .nth(index)
            .ok_or(ToolpathError::NoGeometryFound)?;
        debug!(
            source = %closed.source,
            vertices = closed.points.len(),
            ignored = total - 1,
            "Closed primitive found, skipping stitching"
        );
        return Ok(StitchResult {
            polygon: Polygon::new(closed.points),
            fully_closed: true,
            unconnected: 0,
        });
    }

    let segments: Vec<Segment> = primitives.into_iter().map(|p| p.points).collect();
    let result = stitch_segments(segments, tolerance).ok_or(ToolpathError::NoGeometryFound)?;

    if !result.fully_closed {
        warn!(
            vertices = result.polygon.len(),
            unconnected = result.unconnected,
            "Outline could not be fully closed, continuing with partial chain"
        );
    }

    Ok(result)
}

/// Join open segments into one chain by matching endpoints.
///
/// Starting from the first segment, each pass scans the remaining segments
/// in order and attaches the first one that touches the chain, testing
/// start-to-tail, end-to-tail, start-to-head and end-to-head in that order.
/// The shared point is not duplicated. Stops when nothing attaches or no
/// segments remain. Returns `None` when there is no non-empty segment.
pub fn stitch_segments(segments: Vec<Segment>, tolerance: f64) -> Option<StitchResult> {
    let mut remaining: Vec<Segment> = segments.into_iter().filter(|s| !s.is_empty()).collect();
    if remaining.is_empty() {
        return None;
    }

    let mut chain = remaining.remove(0);

    while !remaining.is_empty() {
        let Some((index, join)) = find_connection(&chain, &remaining, tolerance) else {
            break;
        };
        let segment = remaining.remove(index);
        splice(&mut chain, &segment, join);
    }

    let polygon = Polygon::new(chain);
    let fully_closed = remaining.is_empty() && polygon.len() > 2 && polygon.is_closed(tolerance);

    debug!(
        vertices = polygon.len(),
        unconnected = remaining.len(),
        fully_closed,
        "Stitched segments"
    );

    Some(StitchResult {
        polygon,
        fully_closed,
        unconnected: remaining.len(),
    })
}

fn find_connection(chain: &[Point], remaining: &[Segment], tolerance: f64) -> Option<(usize, Join)> {
    let head = chain.first()?;
    let tail = chain.last()?;

    remaining.iter().enumerate().find_map(|(index, segment)| {
        let start = segment.first()?;
        let end = segment.last()?;

        let join = if tail.approx_eq(start, tolerance) {
            Join::StartToTail
        } else if tail.approx_eq(end, tolerance) {
            Join::EndToTail
        } else if head.approx_eq(start, tolerance) {
            Join::StartToHead
        } else if head.approx_eq(end, tolerance) {
            Join::EndToHead
        } else {
            return None;
        };

        Some((index, join))
    })
}

fn splice(chain: &mut Vec<Point>, segment: &[Point], join: Join) {
    let without_end = &segment[..segment.len() - 1];

    match join {
        Join::StartToTail => chain.extend_from_slice(&segment[1..]),
        Join::EndToTail => chain.extend(without_end.iter().rev().copied()),
        Join::StartToHead => {
            let mut joined: Vec<Point> = segment.iter().rev().copied().collect();
            joined.extend_from_slice(&chain[1..]);
            *chain = joined;
        }
        Join::EndToHead => {
            let mut joined = without_end.to_vec();
            joined.append(chain);
            *chain = joined;
        }
    }
}
