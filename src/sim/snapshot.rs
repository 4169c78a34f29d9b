//! Read-only views for the renderer and the HUD
//!
//! Taken between frames, never during a step. Everything is in world
//! coordinates; camera placement is up to the renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{PointId, StickKind};
use super::state::{GameStatus, SimulationContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointView {
    pub id: PointId,
    pub pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub is_wheel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickView {
    pub from: Vec2,
    pub to: Vec2,
    pub kind: StickKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub pos: Vec2,
    pub radius: f32,
    /// Collected apple / unlocked flower; always false for killers
    pub active: bool,
}

/// Everything the renderer draws
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Top edge to draw, anchors excluded
    pub surface: Vec<Vec2>,
    /// Full outline including the deep anchors, for filling the ground
    pub outline: Vec<Vec2>,
    pub points: Vec<PointView>,
    /// Visible sticks only
    pub sticks: Vec<StickView>,
    pub apples: Vec<EntityView>,
    pub killers: Vec<EntityView>,
    pub flower: EntityView,
    pub status: GameStatus,
    /// Bumps on every level init, lets the renderer snap its camera
    pub level_index: u32,
}

/// Values shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub collected: usize,
    pub total: usize,
    pub elapsed_seconds: f64,
    pub status: GameStatus,
}

impl RenderSnapshot {
    pub fn capture(ctx: &SimulationContext) -> Self {
        let vehicle = &ctx.vehicle;
        let points = PointId::ALL
            .iter()
            .map(|&id| {
                let p = vehicle.point(id);
                PointView {
                    id,
                    pos: p.pos,
                    radius: p.radius,
                    rotation: p.rotation,
                    is_wheel: p.is_wheel,
                }
            })
            .collect();

        let sticks = vehicle
            .sticks
            .iter()
            .filter(|s| s.visible)
            .map(|s| StickView {
                from: vehicle.point(s.a).pos,
                to: vehicle.point(s.b).pos,
                kind: s.kind,
            })
            .collect();

        Self {
            surface: ctx.terrain.surface().to_vec(),
            outline: ctx.terrain.vertices().to_vec(),
            points,
            sticks,
            apples: ctx
                .apples
                .iter()
                .map(|a| EntityView {
                    pos: a.pos,
                    radius: crate::consts::PICKUP_RADIUS,
                    active: a.collected,
                })
                .collect(),
            killers: ctx
                .killers
                .iter()
                .map(|k| EntityView {
                    pos: k.pos,
                    radius: k.radius,
                    active: false,
                })
                .collect(),
            flower: EntityView {
                pos: ctx.flower.pos,
                radius: crate::consts::PICKUP_RADIUS,
                active: ctx.flower.unlocked,
            },
            status: ctx.status(),
            level_index: ctx.level_index,
        }
    }
}

impl HudSnapshot {
    pub fn capture(ctx: &SimulationContext, now: f64) -> Self {
        Self {
            collected: ctx.collected(),
            total: ctx.total_apples(),
            elapsed_seconds: ctx.elapsed_seconds(now),
            status: ctx.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_snapshot_hides_braces_and_anchors() {
        let ctx = SimulationContext::new(3, 2000.0, 800.0, 0.0);
        let snap = RenderSnapshot::capture(&ctx);

        assert_eq!(snap.points.len(), 5);
        assert_eq!(snap.sticks.len(), 5);
        assert!(snap.sticks.iter().all(|s| s.kind != StickKind::Brace));
        assert_eq!(snap.surface.len() + 2, snap.outline.len());
        assert_eq!(snap.surface[0], snap.outline[1]);
        assert_eq!(snap.killers.len(), ctx.killers.len());
        assert_eq!(snap.status, GameStatus::Menu);
    }

    #[test]
    fn test_hud_counts_and_serializes() {
        let mut ctx = SimulationContext::new(3, 2000.0, 800.0, 10.0);
        ctx.init_level(2000.0, 800.0, GameStatus::Playing, 10.0);
        if let Some(apple) = ctx.apples.first_mut() {
            apple.collected = true;
        }

        let hud = HudSnapshot::capture(&ctx, 12.0);
        assert_eq!(hud.total, ctx.apples.len());
        assert_eq!(hud.collected, ctx.apples.len().min(1));
        assert!((hud.elapsed_seconds - 2.0).abs() < 1e-9);

        let json = serde_json::to_string(&hud).expect("hud serializes");
        let back: HudSnapshot = serde_json::from_str(&json).expect("hud parses");
        assert_eq!(back, hud);
    }
}
