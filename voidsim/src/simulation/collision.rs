//! Continuous collision detection between pairs of drifting bodies
//!
//! Two phases per pair and time window:
//! - broad: closest approach of the two straight motion segments over the
//!   window. Both bodies are somewhere on their segments at every instant, so
//!   if the segments never come within contact distance neither do the bodies
//! - narrow: bisection on the time window to find the first instant the
//!   centres are closer than the contact distance
//!
//! Pairs already touching at the start of the window never report a new
//! collision; this is what stops a resolved pair that is still interpenetrating
//! from colliding again and again.

use std::cmp::Ordering;

use super::params::Parameters;
use super::states::{BodyHandle, FrameState, NVec3};

/// Squared lengths below this count as a zero-length segment
const SEGMENT_EPS: f64 = 1e-18;

/// Closest points of two segments and the distance between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProximity {
    pub point_a: NVec3,
    pub point_b: NVec3,
    pub distance: f64,
}

/// Closest approach between segments `a0-a1` and `b0-b1`.
///
/// Zero-length segments (bodies at rest) and parallel segments have their own
/// branches and always give a finite distance.
pub fn distance_between_segments(
    a0: &NVec3,
    a1: &NVec3,
    b0: &NVec3,
    b1: &NVec3,
) -> SegmentProximity {
    let da = a1 - a0; // direction of segment a
    let db = b1 - b0; // direction of segment b
    let r = a0 - b0;
    let len_a = da.norm_squared();
    let len_b = db.norm_squared();
    let f = db.dot(&r);

    // s and t are the clamped parameters of the closest points on a and b
    let (s, t) = if len_a <= SEGMENT_EPS && len_b <= SEGMENT_EPS {
        // two points
        (0.0, 0.0)
    } else if len_a <= SEGMENT_EPS {
        // point against segment b
        (0.0, (f / len_b).clamp(0.0, 1.0))
    } else {
        let c = da.dot(&r);
        if len_b <= SEGMENT_EPS {
            // segment a against point
            ((-c / len_a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = da.dot(&db);
            let denom = len_a * len_b - b * b; // |da x db|^2, never negative in exact arithmetic

            // parallel segments have a whole family of closest pairs; start
            // from a0 and let the clamping below pick the matching point on b
            let s = if denom > SEGMENT_EPS * len_a * len_b {
                ((b * f - c * len_b) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };

            // closest point on b's line to a(s), then clamp and re-project onto a
            let t = (b * s + f) / len_b;
            if t < 0.0 {
                ((-c / len_a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / len_a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    let point_a = a0 + da * s;
    let point_b = b0 + db * t;
    SegmentProximity {
        point_a,
        point_b,
        distance: (point_a - point_b).norm(),
    }
}

/// Centre distance of two drifting states `t` seconds from now
fn distance_at(a: &FrameState, b: &FrameState, t: f64) -> f64 {
    (a.pos_after(t) - b.pos_after(t)).norm()
}

/// Whether the centres are getting closer at time `t`
pub(crate) fn closing_at(a: &FrameState, b: &FrameState, t: f64) -> bool {
    let r = a.pos_after(t) - b.pos_after(t);
    let v = a.velocity - b.velocity;
    r.dot(&v) < 0.0
}

/// Bisect `[t_min, t_max]` for the first time the centres of `a` and `b` come
/// closer than `contact`.
///
/// Returns `None` when the pair already touches at `t_min`, when the distance
/// trend rules out a crossing, or when the iteration budget runs out before
/// any instant in contact has been found. Otherwise returns the earliest
/// in-contact time found, refined until the pair is still closing there and
/// the penetration is below `params.tolerance`. A shallow sample on the
/// separating side lies past the first touch and never ends the search.
pub fn find_collision(
    a: &FrameState,
    b: &FrameState,
    contact: f64,
    t_min: f64,
    t_max: f64,
    params: &Parameters,
) -> Option<f64> {
    let (mut t_min, mut t_max) = (t_min, t_max);
    if !(t_max > t_min) {
        return None;
    }

    let mut d_min = distance_at(a, b, t_min);
    let mut d_max = distance_at(a, b, t_max);
    if d_min < contact {
        // already touching, not a new collision
        return None;
    }

    let mut result = None;
    for _ in 0..params.max_bisections {
        let t_mid = 0.5 * (t_min + t_max);
        let d_mid = distance_at(a, b, t_mid);

        if d_mid < contact {
            // in contact halfway: the first touch is in the first half
            result = Some(t_mid);
            t_max = t_mid;
            d_max = d_mid;
            if contact - d_mid < params.tolerance && closing_at(a, b, t_mid) {
                break;
            }
        } else if d_max < contact {
            // in contact only at the end: the first touch is in the second half
            result = Some(t_max);
            if contact - d_max < params.tolerance && closing_at(a, b, t_max) {
                break;
            }
            t_min = t_mid;
            d_min = d_mid;
        } else {
            // no known point in contact; they may still pass through each
            // other between samples. Keep the half that can hold the crossing.
            let falls_first = d_mid < d_min;
            let falls_second = d_max < d_mid;
            let keep_second = match (falls_first, falls_second) {
                // still approaching at the end: any crossing is past t_mid
                (true, true) => true,
                // dip: the crossing precedes the minimum, which is past t_mid
                // only if they are still closing there
                (true, false) => closing_at(a, b, t_mid),
                // rising (or flat) across the window: only a dip right after
                // t_min can hold a crossing
                (false, false) => {
                    if !closing_at(a, b, t_min) {
                        return None;
                    }
                    false
                }
                // rise then fall cannot happen for straight-line motion
                (false, true) => !closing_at(a, b, t_min),
            };

            if keep_second {
                t_min = t_mid;
                d_min = d_mid;
            } else {
                t_max = t_mid;
                d_max = d_mid;
            }
        }
    }
    result
}

/// Both phases for one pair over `[0, window]`; `None` if they do not start
/// touching inside the window.
pub fn test_pair(
    a: &FrameState,
    radius_a: f64,
    b: &FrameState,
    radius_b: f64,
    window: f64,
    params: &Parameters,
) -> Option<f64> {
    let contact = radius_a + radius_b;
    let near = distance_between_segments(
        &a.position,
        &a.pos_after(window),
        &b.position,
        &b.pos_after(window),
    );
    if near.distance >= contact {
        return None;
    }
    find_collision(a, b, contact, 0.0, window, params)
}

/// A predicted impact, `time` seconds from the current instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub time: f64,
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl Candidate {
    /// Earliest time first, then pair order
    pub fn order(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.a.cmp(&other.a))
            .then_with(|| self.b.cmp(&other.b))
    }
}

