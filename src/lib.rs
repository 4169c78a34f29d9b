//! Trail Rider - A side-scrolling soft-body bike game
//!
//! Core modules:
//! - `sim`: Simulation (Verlet points, stick constraints, terrain collision, game state)
//! - `platform`: Fixed-step frame driver, shared input flags, loop cancellation
//! - `game`: Ties the simulation to the driver (menu, restart, resize)
//! - `settings`: Level and driver configuration

pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz; all velocities are per-step displacements)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Largest frame delta fed to the accumulator, prevents catch-up after a stall
    pub const MAX_FRAME_DT: f64 = 0.1;
    /// Relax + collide passes per physics step
    pub const SOLVER_ITERATIONS: usize = 8;

    /// Downward displacement added every step
    pub const GRAVITY: f32 = 0.4;
    /// Velocity retained per step (air drag)
    pub const DAMPING: f32 = 0.99;
    /// Tangential velocity retained per contact pass
    pub const GROUND_FRICTION: f32 = 0.98;

    /// Throttle impulse applied to the rear wheel's previous x
    pub const BIKE_SPEED: f32 = 0.6;
    /// Lean offset applied to the wheels (handle gets half)
    pub const LEAN_FORCE: f32 = 0.5;
    /// Flip-assist lift applied to the body
    pub const FLIP_LIFT: f32 = 0.4;
    /// Flip-assist forward nudge applied to both wheels' previous x
    pub const FLIP_NUDGE: f32 = 0.1;

    /// Broad-phase margin around each terrain segment's x-range
    pub const BROAD_PHASE_MARGIN: f32 = 50.0;
    /// Head contact closer than this fraction of its radius is fatal
    pub const HEAD_CRASH_RATIO: f32 = 0.8;
    /// Distance below the first terrain vertex at which anything counts as fallen
    pub const FALL_DEPTH: f32 = 2000.0;
    /// Wheel spin per unit of rolling speed (cosmetic)
    pub const WHEEL_SPIN: f32 = 0.2;

    /// Reach for apples and the flower
    pub const PICKUP_RADIUS: f32 = 35.0;
    /// Killer radius when none is given
    pub const DEFAULT_KILLER_RADIUS: f32 = 15.0;

    /// Default level extents
    pub const LEVEL_WIDTH: f32 = 6000.0;
    pub const LEVEL_HEIGHT: f32 = 800.0;
}

/// Closest point to `p` on segment `a..b`, with the clamped projection parameter
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        let (c, t) = closest_point_on_segment(Vec2::new(5.0, 3.0), a, b);
        assert!((c - Vec2::new(5.0, 0.0)).length() < 1e-5);
        assert!((t - 0.5).abs() < 1e-5);

        let (c, t) = closest_point_on_segment(Vec2::new(-4.0, 1.0), a, b);
        assert_eq!(c, a);
        assert_eq!(t, 0.0);

        let (c, t) = closest_point_on_segment(Vec2::new(14.0, -2.0), a, b);
        assert_eq!(c, b);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn test_closest_point_degenerate_segment() {
        let a = Vec2::new(3.0, 3.0);
        let (c, t) = closest_point_on_segment(Vec2::new(9.0, 9.0), a, a);
        assert_eq!(c, a);
        assert_eq!(t, 0.0);
    }
}
