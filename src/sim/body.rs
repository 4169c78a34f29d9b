//! The bike-and-rider rig: five Verlet points joined by nine sticks
//!
//! Sticks refer to points by `PointId`, so a stick can never reach outside
//! the vehicle that owns it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Named points of the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointId {
    RearWheel,
    FrontWheel,
    Body,
    Handle,
    Head,
}

impl PointId {
    /// All points, in storage order
    pub const ALL: [PointId; 5] = [
        PointId::RearWheel,
        PointId::FrontWheel,
        PointId::Body,
        PointId::Handle,
        PointId::Head,
    ];

    /// Points that can touch apples, the flower and killers (the handle can't)
    pub const TOUCH_PARTS: [PointId; 4] = [
        PointId::RearWheel,
        PointId::FrontWheel,
        PointId::Body,
        PointId::Head,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A Verlet mass point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub pos: Vec2,
    /// Position one step ago; velocity is `pos - old_pos`
    pub old_pos: Vec2,
    /// Stored for completeness, the solver splits corrections evenly
    pub mass: f32,
    pub radius: f32,
    pub is_wheel: bool,
    pub pinned: bool,
    /// Accumulated wheel spin (radians)
    pub rotation: f32,
}

impl Point {
    pub fn new(pos: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            pos,
            old_pos: pos,
            mass,
            radius,
            is_wheel: false,
            pinned: false,
            rotation: 0.0,
        }
    }

    pub fn wheel(pos: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            is_wheel: true,
            ..Self::new(pos, mass, radius)
        }
    }

    /// Implicit Verlet velocity (displacement per step)
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.pos - self.old_pos
    }
}

/// Role of a stick in the rig; decides stiffness and visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StickKind {
    /// Soft wheel-to-frame link
    Suspension,
    Frame,
    Neck,
    /// Invisible cross-bracing that keeps the rig from folding
    Brace,
}

impl StickKind {
    pub fn stiffness(self) -> f32 {
        match self {
            StickKind::Suspension => 0.5,
            StickKind::Frame | StickKind::Neck | StickKind::Brace => 1.0,
        }
    }

    pub fn visible(self) -> bool {
        self != StickKind::Brace
    }
}

/// Distance constraint between two points of the same vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stick {
    pub a: PointId,
    pub b: PointId,
    pub rest_length: f32,
    /// Fraction of the length error corrected per pass, in (0, 1]
    pub stiffness: f32,
    pub visible: bool,
    pub kind: StickKind,
}

impl Stick {
    /// Stick whose rest length is the current distance between its endpoints
    pub fn between(points: &[Point], a: PointId, b: PointId, kind: StickKind) -> Self {
        let rest_length = points[a.index()].pos.distance(points[b.index()].pos);
        Self::with_length(a, b, rest_length, kind)
    }

    /// Stick with an explicit rest length
    pub fn with_length(a: PointId, b: PointId, rest_length: f32, kind: StickKind) -> Self {
        Self {
            a,
            b,
            rest_length,
            stiffness: kind.stiffness(),
            visible: kind.visible(),
            kind,
        }
    }
}

pub const STICK_COUNT: usize = 9;

/// The rider-and-bike rig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Indexed by `PointId::index`
    pub points: [Point; 5],
    pub sticks: [Stick; STICK_COUNT],
}

impl Vehicle {
    #[inline]
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.index()]
    }

    #[inline]
    pub fn point_mut(&mut self, id: PointId) -> &mut Point {
        &mut self.points[id.index()]
    }

    /// Move the whole rig without changing its velocity
    pub fn translate(&mut self, offset: Vec2) {
        for p in &mut self.points {
            p.pos += offset;
            p.old_pos += offset;
        }
    }

    /// Mean absolute difference between current and rest lengths
    pub fn mean_stick_error(&self) -> f32 {
        let total: f32 = self
            .sticks
            .iter()
            .map(|s| {
                let d = self.point(s.a).pos.distance(self.point(s.b).pos);
                (d - s.rest_length).abs()
            })
            .sum();
        total / STICK_COUNT as f32
    }
}

/// Build the rig with its wheels resting on the line `y = start_y`
pub fn build_vehicle(start_x: f32, start_y: f32) -> Vehicle {
    use PointId::*;

    let at = |dx: f32, dy: f32| Vec2::new(start_x + dx, start_y + dy);
    let points = [
        Point::wheel(at(-35.0, 0.0), 2.0, 15.0),
        Point::wheel(at(35.0, 0.0), 2.0, 15.0),
        Point::new(at(-5.0, -30.0), 3.0, 10.0),
        Point::new(at(22.0, -45.0), 1.0, 5.0),
        Point::new(at(-5.0, -70.0), 2.0, 12.0),
    ];

    let sticks = [
        Stick::between(&points, RearWheel, Body, StickKind::Suspension),
        Stick::between(&points, FrontWheel, Handle, StickKind::Suspension),
        Stick::between(&points, Body, Handle, StickKind::Frame),
        Stick::between(&points, Handle, Head, StickKind::Frame),
        Stick::between(&points, Body, Head, StickKind::Neck),
        Stick::between(&points, RearWheel, FrontWheel, StickKind::Brace),
        Stick::between(&points, RearWheel, Handle, StickKind::Brace),
        Stick::between(&points, FrontWheel, Body, StickKind::Brace),
        Stick::between(&points, RearWheel, Head, StickKind::Brace),
    ];

    Vehicle { points, sticks }
}
