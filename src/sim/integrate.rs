//! Verlet integration and player controls
//!
//! Controls are position edits, not forces: shifting a point's previous
//! position changes the velocity the next integration derives.

use glam::Vec2;

use super::body::{Point, PointId, Vehicle};
use super::state::SimulationContext;
use super::tick::InputState;
use crate::consts::*;

/// Apply control impulses, then integrate every non-pinned point one step
pub fn advance(ctx: &mut SimulationContext) {
    apply_controls(&mut ctx.vehicle, &ctx.input);
    integrate(&mut ctx.vehicle.points);
}

/// Translate the input flags into position edits on the rig
pub fn apply_controls(vehicle: &mut Vehicle, input: &InputState) {
    use PointId::*;

    // Throttle: rear wheel's previous x pulled back => forward (+x) velocity
    if input.up {
        nudge_old(vehicle.point_mut(RearWheel), Vec2::new(-BIKE_SPEED, 0.0));
    }
    // Brake: weaker opposing push
    if input.down {
        nudge_old(vehicle.point_mut(RearWheel), Vec2::new(BIKE_SPEED * 0.5, 0.0));
    }

    // Lean back: front up, rear down, handle pulled toward the rider
    if input.left {
        nudge(vehicle.point_mut(FrontWheel), Vec2::new(0.0, -LEAN_FORCE));
        nudge(vehicle.point_mut(RearWheel), Vec2::new(0.0, LEAN_FORCE));
        nudge(vehicle.point_mut(Handle), Vec2::new(-LEAN_FORCE * 0.5, 0.0));
    }
    // Lean forward: mirror of lean back
    if input.right {
        nudge(vehicle.point_mut(FrontWheel), Vec2::new(0.0, LEAN_FORCE));
        nudge(vehicle.point_mut(RearWheel), Vec2::new(0.0, -LEAN_FORCE));
        nudge(vehicle.point_mut(Handle), Vec2::new(LEAN_FORCE * 0.5, 0.0));
    }

    // Flip assist: lift the body, small forward push on both wheels
    if input.space {
        nudge(vehicle.point_mut(Body), Vec2::new(0.0, -FLIP_LIFT));
        nudge_old(vehicle.point_mut(RearWheel), Vec2::new(-FLIP_NUDGE, 0.0));
        nudge_old(vehicle.point_mut(FrontWheel), Vec2::new(-FLIP_NUDGE, 0.0));
    }
}

/// Verlet step: damped implicit velocity plus gravity
pub fn integrate(points: &mut [Point]) {
    for p in points.iter_mut().filter(|p| !p.pinned) {
        let vel = (p.pos - p.old_pos) * DAMPING;
        p.old_pos = p.pos;
        p.pos.x += vel.x;
        p.pos.y += vel.y + GRAVITY;
    }
}

#[inline]
fn nudge(p: &mut Point, offset: Vec2) {
    if !p.pinned {
        p.pos += offset;
    }
}

#[inline]
fn nudge_old(p: &mut Point, offset: Vec2) {
    if !p.pinned {
        p.old_pos += offset;
    }
}
