//! Point vs. terrain collision and response
//!
//! Points are circles, the terrain is a polyline. Overlapping points are
//! pushed out along the contact normal, then lose part of their sliding
//! velocity to ground friction. The loop runs per point (outer) and per
//! segment (inner), and friction reads the velocity as it stands mid-pass.

use glam::Vec2;

use super::body::{Point, PointId};
use super::state::{DeathCause, SimulationContext};
use super::terrain::Terrain;
use crate::closest_point_on_segment;
use crate::consts::*;

/// Result of one collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// All contacts resolved
    Resolved,
    /// Pass aborted, the run is over
    Fatal(DeathCause),
}

/// Resolve the vehicle against the terrain once
///
/// Stops at the first fatal condition; the caller decides the transition.
pub fn resolve(ctx: &mut SimulationContext) -> CollisionOutcome {
    let terrain = &ctx.terrain;
    let points = &mut ctx.vehicle.points;

    let fall_line = terrain.fall_line();
    if points.iter().any(|p| p.pos.y > fall_line) {
        return CollisionOutcome::Fatal(DeathCause::Fell);
    }

    for id in PointId::ALL {
        let outcome = resolve_point(&mut points[id.index()], id == PointId::Head, terrain);
        if outcome != CollisionOutcome::Resolved {
            return outcome;
        }
    }

    CollisionOutcome::Resolved
}

/// Resolve a single point against every terrain segment
pub fn resolve_point(p: &mut Point, is_head: bool, terrain: &Terrain) -> CollisionOutcome {
    for (a, b) in terrain.segments() {
        // Broad phase: x-range of the segment plus a margin
        let min_x = a.x.min(b.x) - BROAD_PHASE_MARGIN;
        let max_x = a.x.max(b.x) + BROAD_PHASE_MARGIN;
        if p.pos.x < min_x || p.pos.x > max_x {
            continue;
        }

        let (closest, _t) = closest_point_on_segment(p.pos, a, b);
        let diff = p.pos - closest;
        let dist = diff.length();
        if dist >= p.radius {
            continue;
        }

        if is_head && dist < p.radius * HEAD_CRASH_RATIO {
            return CollisionOutcome::Fatal(DeathCause::HeadCrash);
        }

        let normal = if dist > f32::EPSILON {
            diff / dist
        } else {
            Vec2::new(0.0, -1.0)
        };
        p.pos += normal * (p.radius - dist);

        apply_friction(p, normal);
    }

    CollisionOutcome::Resolved
}

/// Damp sliding along the contact and spin wheels
fn apply_friction(p: &mut Point, normal: Vec2) {
    let tangent = Vec2::new(-normal.y, normal.x);
    let vel = p.velocity();
    let along = vel.dot(tangent);

    p.old_pos += tangent * along * (1.0 - GROUND_FRICTION);

    if p.is_wheel {
        let direction = if along > 0.0 {
            1.0
        } else if along < 0.0 {
            -1.0
        } else {
            0.0
        };
        p.rotation += vel.length() * direction * WHEEL_SPIN;
    }
}
