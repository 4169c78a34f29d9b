//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only (one call to `tick` is one step)
//! - Seeded RNG only, owned by the context
//! - Stable iteration order (points by `PointId`, segments left to right)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod constraint;
pub mod integrate;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod tick;

pub use body::{Point, PointId, Stick, StickKind, Vehicle, build_vehicle};
pub use collision::{CollisionOutcome, resolve, resolve_point};
pub use constraint::relax;
pub use integrate::advance;
pub use snapshot::{HudSnapshot, RenderSnapshot};
pub use state::{
    Apple, DeathCause, Flower, GameEvent, GameStatus, Killer, SimulationContext,
};
pub use terrain::{Level, RandomSource, Terrain, generate};
pub use tick::{InputState, evaluate, tick};
