//! Stick (distance constraint) relaxation
//!
//! One call is one Gauss-Seidel pass: sticks are corrected in order and each
//! correction sees the positions left by the previous one.

use super::body::{Point, Stick};

/// Relax every stick once
///
/// Corrections split evenly between the endpoints regardless of mass. A
/// pinned endpoint takes nothing and its partner takes the whole correction;
/// zero-length sticks are skipped.
pub fn relax(points: &mut [Point], sticks: &[Stick]) {
    for stick in sticks {
        let (ia, ib) = (stick.a.index(), stick.b.index());
        let delta = points[ib].pos - points[ia].pos;
        let dist = delta.length();
        if dist == 0.0 {
            continue;
        }

        let k = (stick.rest_length - dist) / dist * stick.stiffness;
        let offset = delta * k * 0.5;

        match (points[ia].pinned, points[ib].pinned) {
            (false, false) => {
                points[ia].pos -= offset;
                points[ib].pos += offset;
            }
            (true, false) => points[ib].pos += offset * 2.0,
            (false, true) => points[ia].pos -= offset * 2.0,
            (true, true) => {}
        }
    }
}
