//! Procedural terrain: a ground polyline plus apples, killers and the flower
//!
//! The polyline is bracketed by two deep anchor vertices far below the level,
//! so anything that falls off either end keeps falling past the fall line.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Apple, Flower, Killer};
use crate::consts::DEFAULT_KILLER_RADIUS;

/// Height of the starting runway above the level bottom
pub const GROUND_OFFSET: f32 = 200.0;
/// Flat spawn runway, ending at this x
pub const RUNWAY_END: f32 = 300.0;
/// Horizontal step between generated vertices, [min, max)
pub const STEP_RANGE: (f32, f32) = (80.0, 180.0);
/// Maximum vertical change per step
pub const HEIGHT_VARIATION: f32 = 125.0;
/// Chance a vertex snaps back to runway height
pub const FLAT_CHANCE: f32 = 0.2;
/// Chance of an apple above each generated vertex
pub const APPLE_CHANCE: f32 = 0.5;
/// Apple height above the ground, [min, max)
pub const APPLE_LIFT: (f32, f32) = (120.0, 170.0);
/// Chance of a killer on each segment from `KILLER_FIRST_SEGMENT` on
pub const KILLER_CHANCE: f32 = 0.3;
pub const KILLER_FIRST_SEGMENT: usize = 3;
/// Anchor depth below the level bottom
pub const ANCHOR_DEPTH: f32 = 2000.0;
/// Anchor horizontal overhang beyond the generated ends
pub const ANCHOR_OVERHANG: f32 = 500.0;
/// Flower height above the final vertex
pub const FLOWER_LIFT: f32 = 100.0;

/// Source of uniform draws in [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;

    /// Uniform draw in [lo, hi)
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_unit() * (hi - lo)
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }
}

impl<R: rand::Rng> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Ground polyline, first and last vertices are the deep anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    vertices: Vec<Vec2>,
}

impl Terrain {
    /// Panics on fewer than two vertices; terrain is always built internally.
    pub fn new(vertices: Vec<Vec2>) -> Self {
        assert!(
            vertices.len() >= 2,
            "terrain needs at least 2 vertices, got {}",
            vertices.len()
        );
        Self { vertices }
    }

    /// Every vertex, anchors included (collision geometry)
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Rideable top edge, anchors excluded (render geometry)
    pub fn surface(&self) -> &[Vec2] {
        &self.vertices[1..self.vertices.len() - 1]
    }

    /// Consecutive vertex pairs
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.vertices.windows(2).map(|w| (w[0], w[1]))
    }

    /// Anything below this y has fallen out of the level
    pub fn fall_line(&self) -> f32 {
        self.vertices[0].y + crate::consts::FALL_DEPTH
    }
}

/// Generated level content
#[derive(Debug, Clone)]
pub struct Level {
    pub terrain: Terrain,
    pub apples: Vec<Apple>,
    pub killers: Vec<Killer>,
    pub flower: Flower,
}

/// Generate a level `level_width` long
///
/// Draw order per generated vertex: step, height variation, flat roll,
/// apple roll (+ apple lift when placed), killer roll (from the 4th segment).
pub fn generate<R: RandomSource + ?Sized>(
    random: &mut R,
    level_width: f32,
    level_height: f32,
) -> Level {
    let ground = level_height - GROUND_OFFSET;
    let mut vertices = vec![Vec2::new(0.0, ground), Vec2::new(RUNWAY_END, ground)];
    let mut apples = Vec::new();
    let mut killers = Vec::new();

    let mut x = RUNWAY_END;
    let mut y = ground;
    let mut segment = 0usize;

    while x < level_width {
        let prev = Vec2::new(x, y);

        x += random.range(STEP_RANGE.0, STEP_RANGE.1);
        y += random.range(-HEIGHT_VARIATION, HEIGHT_VARIATION);
        y = y.clamp(200.0, level_height + 200.0);
        if random.chance(FLAT_CHANCE) {
            y = ground;
        }

        let vertex = Vec2::new(x, y);
        vertices.push(vertex);

        if random.chance(APPLE_CHANCE) {
            let lift = random.range(APPLE_LIFT.0, APPLE_LIFT.1);
            apples.push(Apple::new(vertex - Vec2::Y * lift));
        }

        if segment >= KILLER_FIRST_SEGMENT && random.chance(KILLER_CHANCE) {
            let mid = (prev + vertex) * 0.5;
            killers.push(Killer::new(mid - Vec2::Y * DEFAULT_KILLER_RADIUS, None));
        }

        segment += 1;
    }

    let last = vertices[vertices.len() - 1];
    let flower = Flower::new(last - Vec2::Y * FLOWER_LIFT);

    let anchor_y = level_height + ANCHOR_DEPTH;
    let start_x = vertices[0].x;
    vertices.insert(0, Vec2::new(start_x - ANCHOR_OVERHANG, anchor_y));
    vertices.push(Vec2::new(last.x + ANCHOR_OVERHANG, anchor_y));

    log::debug!(
        "Generated {} segments over {:.0} units",
        segment,
        last.x - start_x
    );

    Level {
        terrain: Terrain::new(vertices),
        apples,
        killers,
        flower,
    }
}
