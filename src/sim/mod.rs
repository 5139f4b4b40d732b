//! Gameplay simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, plays
//! audio, or touches storage:
//! - Randomness is passed in by the caller
//! - Physics advances only when the host calls it
//! - State is read through shared references or events

pub mod events;
pub mod state;
pub mod turn;
pub mod wedges;
pub mod wheel;

pub use events::{EventBus, EventKind, GameEvent, LoseTurnReason, SubscriptionId};
pub use state::{GamePhase, GameState, GuessedLetters, WedgeKind, WedgeResult};
pub use turn::{GuessResult, SolveResult, TurnStateMachine, normalize_solve_text};
pub use wedges::{Wedge, WheelLayout};
pub use wheel::{
    FrictionTier, TickTracker, WheelPhysicsState, calculate_landing_segment, force_stop,
    generate_spin_velocity, is_tick, start_spin, update_physics,
};
