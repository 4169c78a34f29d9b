//! Simulation context and game status
//!
//! Everything one running level needs lives in `SimulationContext`, which is
//! passed explicitly to every simulation operation.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Vehicle, build_vehicle};
use super::terrain::{Level, Terrain, generate};
use super::tick::InputState;
use crate::consts::*;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Idle, nothing simulates
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Reached the flower (terminal until re-initialized)
    Won,
    /// Crashed, fell or hit a killer (terminal until re-initialized)
    Dead,
}

/// Why a run ended in `Dead`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Dropped below the fall line
    Fell,
    /// Head pushed too far into the ground
    HeadCrash,
    /// Touched a killer
    Killer,
}

/// Gameplay notifications, drained by the driver each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    AppleCollected { index: usize },
    FlowerUnlocked,
    Won { elapsed: f64 },
    Died { cause: DeathCause },
}

/// Collectible apple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apple {
    pub pos: Vec2,
    pub collected: bool,
}

impl Apple {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            collected: false,
        }
    }
}

/// Hazard; touching one is fatal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Killer {
    pub pos: Vec2,
    pub radius: f32,
}

impl Killer {
    pub fn new(pos: Vec2, radius: Option<f32>) -> Self {
        Self {
            pos,
            radius: radius.unwrap_or(DEFAULT_KILLER_RADIUS),
        }
    }
}

/// Level goal, reachable once every apple is collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flower {
    pub pos: Vec2,
    pub unlocked: bool,
}

impl Flower {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            unlocked: false,
        }
    }
}

/// Spawn x for the rear of the rig, on the starting runway
pub const SPAWN_X: f32 = 150.0;
/// Height above the runway at which the wheels are dropped in
pub const SPAWN_DROP: f32 = 20.0;

/// The whole mutable simulation for one game instance
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub vehicle: Vehicle,
    pub terrain: Terrain,
    pub apples: Vec<Apple>,
    pub killers: Vec<Killer>,
    pub flower: Flower,
    /// Latest input snapshot, read once per step
    pub input: InputState,
    /// Changes only through `init_level`, `die` and `win`
    status: GameStatus,
    pub level_width: f32,
    pub level_height: f32,
    /// Wall-clock time (seconds) when the current level started
    pub started_at: f64,
    /// Wall-clock time when the run reached Won or Dead
    pub finished_at: Option<f64>,
    /// Physics steps taken in the current level
    pub time_ticks: u64,
    /// Pending notifications
    pub events: Vec<GameEvent>,
    /// Levels generated so far by this context
    pub level_index: u32,
    seed: u64,
    rng: Pcg32,
}

impl SimulationContext {
    /// Create a context in `Menu` with a generated level behind it
    pub fn new(seed: u64, level_width: f32, level_height: f32, now: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = generate(&mut rng, level_width, level_height);
        let mut ctx = Self::from_level(level, level_width, level_height);
        ctx.status = GameStatus::Menu;
        ctx.seed = seed;
        ctx.rng = rng;
        ctx.started_at = now;
        ctx.level_index = 1;
        ctx.log_level();
        ctx
    }

    /// Build a context around a prepared level, already `Playing`
    ///
    /// Used for hand-made layouts; the vehicle spawns on the runway.
    pub fn from_level(level: Level, level_width: f32, level_height: f32) -> Self {
        let vehicle = spawn_vehicle(level_height);
        Self::with_vehicle(vehicle, level, level_width, level_height)
    }

    /// Build a context around a prepared level and vehicle, already `Playing`
    pub fn with_vehicle(
        vehicle: Vehicle,
        level: Level,
        level_width: f32,
        level_height: f32,
    ) -> Self {
        let Level {
            terrain,
            apples,
            killers,
            flower,
        } = level;
        Self {
            vehicle,
            terrain,
            apples,
            killers,
            flower,
            input: InputState::default(),
            status: GameStatus::Playing,
            level_width,
            level_height,
            started_at: 0.0,
            finished_at: None,
            time_ticks: 0,
            events: Vec::new(),
            level_index: 0,
            seed: 0,
            rng: Pcg32::seed_from_u64(0),
        }
    }

    /// Regenerate terrain and entities, rebuild the vehicle, reset timers
    pub fn init_level(
        &mut self,
        level_width: f32,
        level_height: f32,
        status: GameStatus,
        now: f64,
    ) {
        let level = generate(&mut self.rng, level_width, level_height);
        self.vehicle = spawn_vehicle(level_height);
        self.terrain = level.terrain;
        self.apples = level.apples;
        self.killers = level.killers;
        self.flower = level.flower;
        self.input = InputState::default();
        self.status = status;
        self.level_width = level_width;
        self.level_height = level_height;
        self.started_at = now;
        self.finished_at = None;
        self.time_ticks = 0;
        self.events.clear();
        self.level_index += 1;
        self.log_level();
    }

    fn log_level(&self) {
        log::info!(
            "Level {} (seed {}): {}x{}, {} vertices, {} apples, {} killers, status {:?}",
            self.level_index,
            self.seed,
            self.level_width,
            self.level_height,
            self.terrain.vertices().len(),
            self.apples.len(),
            self.killers.len(),
            self.status
        );
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[cfg(test)]
    pub(crate) fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    /// End the run as a loss; ignored unless `Playing`
    pub fn die(&mut self, cause: DeathCause, now: f64) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.status = GameStatus::Dead;
        self.finished_at = Some(now);
        self.events.push(GameEvent::Died { cause });
        log::info!(
            "Died ({:?}) after {:.2}s, {}/{} apples",
            cause,
            self.elapsed_seconds(now),
            self.collected(),
            self.total_apples()
        );
        true
    }

    /// End the run as a win; ignored unless `Playing`
    pub fn win(&mut self, now: f64) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.status = GameStatus::Won;
        self.finished_at = Some(now);
        let elapsed = self.elapsed_seconds(now);
        self.events.push(GameEvent::Won { elapsed });
        log::info!("Won in {:.2}s", elapsed);
        true
    }

    /// Seconds since the level started, frozen once the run ends
    pub fn elapsed_seconds(&self, now: f64) -> f64 {
        let end = self.finished_at.unwrap_or(now);
        (end - self.started_at).max(0.0)
    }

    pub fn collected(&self) -> usize {
        self.apples.iter().filter(|a| a.collected).count()
    }

    pub fn total_apples(&self) -> usize {
        self.apples.len()
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The rig dropped onto the starting runway
fn spawn_vehicle(level_height: f32) -> Vehicle {
    let runway = level_height - super::terrain::GROUND_OFFSET;
    let wheel_radius = 15.0;
    build_vehicle(SPAWN_X, runway - wheel_radius - SPAWN_DROP)
}
