//! Simulation core
//!
//! All gameplay logic lives here. This module stays free of platform code:
//! - Time arrives as host timestamps (ms), never read from a clock here
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or scheduling dependencies

pub mod clock;
pub mod damage;
pub mod input;
pub mod progression;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::SessionClock;
pub use input::{KeyOutcome, apply_action, handle_key, resolve_target};
pub use snapshot::{EnemyView, ExplosionView, ProjectileView, Snapshot, SnapshotThrottle};
pub use spawn::{SpawnSkip, try_spawn};
pub use state::{
    Enemy, EntityId, Explosion, GamePhase, GameState, Progress, Projectile, SoundCounters,
    TypingState,
};
pub use tick::{TickReport, frame_delta, tick};
