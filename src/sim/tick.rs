//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation one step and evaluates
//! pickups, the goal and hazards from the resulting positions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{PointId, Vehicle};
use super::collision::{CollisionOutcome, resolve};
use super::constraint::relax;
use super::integrate::advance;
use super::state::{DeathCause, GameEvent, GameStatus, SimulationContext};
use crate::consts::*;

/// Player input flags, copied into the context once per step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// Throttle
    pub up: bool,
    /// Brake
    pub down: bool,
    /// Lean back
    pub left: bool,
    /// Lean forward
    pub right: bool,
    /// Flip assist (also starts a run from the menu)
    pub space: bool,
    /// Start / restart
    pub enter: bool,
}

/// Advance the simulation by one fixed step
///
/// Does nothing unless the game is `Playing`. `now` is wall-clock seconds,
/// only used to stamp the end of a run.
pub fn tick(ctx: &mut SimulationContext, now: f64) {
    if ctx.status() != GameStatus::Playing {
        return;
    }

    ctx.time_ticks += 1;
    advance(ctx);

    for _ in 0..SOLVER_ITERATIONS {
        relax(&mut ctx.vehicle.points, &ctx.vehicle.sticks);
        if let CollisionOutcome::Fatal(cause) = resolve(ctx) {
            ctx.die(cause, now);
            return;
        }
    }

    evaluate(ctx, now);
}

/// Pickups, flower unlock, win and hazard checks on post-physics positions
pub fn evaluate(ctx: &mut SimulationContext, now: f64) {
    if ctx.status() != GameStatus::Playing {
        return;
    }

    for (index, apple) in ctx.apples.iter_mut().enumerate() {
        if !apple.collected && touches(&ctx.vehicle, apple.pos, PICKUP_RADIUS) {
            apple.collected = true;
            ctx.events.push(GameEvent::AppleCollected { index });
            log::debug!("Apple {} collected", index);
        }
    }

    if !ctx.flower.unlocked && ctx.apples.iter().all(|a| a.collected) {
        ctx.flower.unlocked = true;
        ctx.events.push(GameEvent::FlowerUnlocked);
        log::debug!("Flower unlocked");
    }

    if ctx.flower.unlocked && touches(&ctx.vehicle, ctx.flower.pos, PICKUP_RADIUS) {
        ctx.win(now);
    }

    let hit_killer = ctx.killers.iter().any(|k| {
        PointId::TOUCH_PARTS.iter().any(|&id| {
            let part = ctx.vehicle.point(id);
            part.pos.distance(k.pos) < k.radius + part.radius
        })
    });
    if hit_killer {
        ctx.die(DeathCause::Killer, now);
    }
}

/// True when any touching part is within `reach` of `target`
fn touches(vehicle: &Vehicle, target: Vec2, reach: f32) -> bool {
    PointId::TOUCH_PARTS
        .iter()
        .any(|&id| vehicle.point(id).pos.distance(target) < reach)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::build_vehicle;
    use crate::sim::state::{Apple, Flower, Killer};
    use crate::sim::terrain::{Level, Terrain};

    const GROUND: f32 = 600.0;

    /// Long flat ground at y = 600 with deep anchors
    fn flat_level(apples: Vec<Apple>, killers: Vec<Killer>, flower: Vec2) -> Level {
        Level {
            terrain: Terrain::new(vec![
                Vec2::new(-2500.0, 2800.0),
                Vec2::new(-2000.0, GROUND),
                Vec2::new(4000.0, GROUND),
                Vec2::new(4500.0, 2800.0),
            ]),
            apples,
            killers,
            flower: Flower::new(flower),
        }
    }

    /// Rig with wheels resting on the ground at x = 100
    fn resting_ctx(level: Level) -> SimulationContext {
        let vehicle = build_vehicle(100.0, GROUND - 15.0);
        SimulationContext::with_vehicle(vehicle, level, 4000.0, 800.0)
    }

    fn positions(ctx: &SimulationContext) -> Vec<(Vec2, Vec2)> {
        ctx.vehicle.points.iter().map(|p| (p.pos, p.old_pos)).collect()
    }

    #[test]
    fn test_menu_does_not_simulate() {
        let mut ctx = resting_ctx(flat_level(vec![], vec![], Vec2::new(3000.0, 500.0)));
        ctx.set_status(GameStatus::Menu);
        let before = positions(&ctx);

        for _ in 0..10 {
            tick(&mut ctx, 0.0);
        }
        assert_eq!(positions(&ctx), before);
        assert_eq!(ctx.time_ticks, 0);
    }

    #[test]
    fn test_throttle_moves_rear_wheel_forward() {
        let mut ctx = resting_ctx(flat_level(vec![], vec![], Vec2::new(3000.0, 500.0)));
        ctx.input.up = true;

        for step in 0..20 {
            tick(&mut ctx, 0.0);
            if ctx.status() != GameStatus::Playing {
                break;
            }
            let vx = ctx.vehicle.point(PointId::RearWheel).velocity().x;
            assert!(vx > 0.0, "rear wheel vx {vx} on step {step}");
        }
    }

    #[test]
    fn test_vehicle_settles_on_flat_ground() {
        let level = flat_level(vec![], vec![], Vec2::new(3000.0, 500.0));
        let vehicle = build_vehicle(100.0, GROUND - 35.0);
        let mut ctx = SimulationContext::with_vehicle(vehicle, level, 4000.0, 800.0);

        for _ in 0..1200 {
            tick(&mut ctx, 0.0);
        }
        assert_eq!(ctx.status(), GameStatus::Playing);

        for id in [PointId::RearWheel, PointId::FrontWheel] {
            let wheel = ctx.vehicle.point(id);
            let gap = GROUND - wheel.pos.y;
            assert!((gap - wheel.radius).abs() < 0.5, "{id:?} rests {gap} above ground");
            assert!(wheel.velocity().length() < 0.05, "{id:?} still moving");
        }
    }

    #[test]
    fn test_head_crash_kills_on_the_same_step() {
        let mut ctx = resting_ctx(flat_level(vec![], vec![], Vec2::new(3000.0, 500.0)));
        // Sink the rig so the head sits 3 units above the ground line
        ctx.vehicle = build_vehicle(100.0, GROUND - 3.0 + 70.0);
        ctx.input = InputState {
            up: true,
            down: true,
            left: true,
            right: true,
            space: true,
            enter: true,
        };

        tick(&mut ctx, 1.5);
        assert_eq!(ctx.status(), GameStatus::Dead);
        assert_eq!(ctx.time_ticks, 1);
        assert_eq!(
            ctx.drain_events(),
            vec![GameEvent::Died {
                cause: DeathCause::HeadCrash
            }]
        );
        assert_eq!(ctx.finished_at, Some(1.5));
    }

    #[test]
    fn test_falling_anywhere_kills() {
        for x in [-6000.0, 100.0, 9000.0] {
            let mut ctx = resting_ctx(flat_level(vec![], vec![], Vec2::new(3000.0, 500.0)));
            let depth = ctx.terrain.fall_line() + 10.0;
            ctx.vehicle = build_vehicle(x, depth + 70.0);

            tick(&mut ctx, 0.0);
            assert_eq!(ctx.status(), GameStatus::Dead, "x = {x}");
            assert_eq!(
                ctx.events.last(),
                Some(&GameEvent::Died {
                    cause: DeathCause::Fell
                })
            );
        }
    }

    #[test]
    fn test_collect_then_win_exactly_once() {
        let body = build_vehicle(100.0, GROUND - 15.0).point(PointId::Body).pos;
        let flower = Vec2::new(2000.0, GROUND - 100.0);
        let mut ctx = resting_ctx(flat_level(vec![Apple::new(body)], vec![], flower));

        tick(&mut ctx, 1.0);
        assert!(ctx.apples[0].collected);
        assert!(ctx.flower.unlocked);
        assert_eq!(ctx.status(), GameStatus::Playing);

        // Carry the rig over to the flower
        let offset = flower - ctx.vehicle.point(PointId::Body).pos;
        ctx.vehicle.translate(offset);
        tick(&mut ctx, 2.0);
        assert_eq!(ctx.status(), GameStatus::Won);

        for _ in 0..5 {
            tick(&mut ctx, 3.0);
        }
        assert_eq!(ctx.status(), GameStatus::Won);

        let events = ctx.drain_events();
        let wins = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Won { .. }))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(events[0], GameEvent::AppleCollected { index: 0 });
        assert_eq!(events[1], GameEvent::FlowerUnlocked);
        assert_eq!(ctx.elapsed_seconds(50.0), 2.0);
    }

    #[test]
    fn test_locked_flower_does_not_win() {
        let far_apple = Apple::new(Vec2::new(3500.0, 450.0));
        let flower = build_vehicle(100.0, GROUND - 15.0).point(PointId::Head).pos;
        let mut ctx = resting_ctx(flat_level(vec![far_apple], vec![], flower));

        for _ in 0..5 {
            tick(&mut ctx, 0.0);
        }
        assert!(!ctx.flower.unlocked);
        assert_eq!(ctx.status(), GameStatus::Playing);
    }

    #[test]
    fn test_handle_cannot_collect() {
        let mut ctx = resting_ctx(flat_level(vec![], vec![], Vec2::new(3000.0, 500.0)));
        // Within reach of the handle only
        let handle = ctx.vehicle.point(PointId::Handle).pos;
        let target = handle + Vec2::new(20.0, -15.0);
        assert!(!touches(&ctx.vehicle, target, PICKUP_RADIUS));
        assert!(ctx.vehicle.point(PointId::Handle).pos.distance(target) < PICKUP_RADIUS);

        ctx.apples.push(Apple::new(target));
        evaluate(&mut ctx, 0.0);
        assert!(!ctx.apples[0].collected);
    }

    #[test]
    fn test_killer_contact_kills() {
        let head = build_vehicle(100.0, GROUND - 15.0).point(PointId::Head).pos;
        let killer = Killer::new(head, None);
        let mut ctx = resting_ctx(flat_level(
            vec![Apple::new(Vec2::new(3500.0, 450.0))],
            vec![killer],
            Vec2::new(3000.0, 500.0),
        ));

        tick(&mut ctx, 4.0);
        assert_eq!(ctx.status(), GameStatus::Dead);
        assert!(ctx.events.contains(&GameEvent::Died {
            cause: DeathCause::Killer
        }));
    }
}
