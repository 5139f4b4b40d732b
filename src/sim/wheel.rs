//! Wheel physics
//!
//! Angular deceleration and landing resolution. All functions are pure:
//! state goes in, new state comes out, and the host decides when to call
//! them (normally once per rendered frame).
//!
//! Friction is specified per 60 Hz frame and rescaled by elapsed time, so the
//! wheel slows the same way at any frame rate.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::normalize_rotation;

/// Deceleration tier, escalating as the spin winds down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrictionTier {
    Normal,
    /// Slow crawl toward the pointer
    Final,
    /// Last moments before settling
    LowSpeed,
}

impl FrictionTier {
    /// Pick the tier for the current velocity and rotation count
    pub fn select(angular_velocity: f64, rotations_completed: u32) -> Self {
        if rotations_completed < MIN_ROTATIONS {
            FrictionTier::Normal
        } else if angular_velocity < LOW_SPEED_TIER_VELOCITY {
            FrictionTier::LowSpeed
        } else if angular_velocity < FINAL_TIER_VELOCITY {
            FrictionTier::Final
        } else {
            FrictionTier::Normal
        }
    }

    /// Per-frame multiplier at the reference frame rate
    pub fn base(self) -> f64 {
        match self {
            FrictionTier::Normal => FRICTION_NORMAL,
            FrictionTier::Final => FRICTION_FINAL,
            FrictionTier::LowSpeed => FRICTION_LOW_SPEED,
        }
    }

    /// Multiplier for an arbitrary time step
    pub fn scale(self, dt: f64) -> f64 {
        self.base().powf(dt * FRICTION_REFERENCE_FPS)
    }
}

/// Physical state of one wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelPhysicsState {
    /// rad/s, never negative
    pub angular_velocity: f64,
    /// Radians, unbounded
    pub rotation: f64,
    pub is_spinning: bool,
    /// Full turns since the spin started
    pub rotations_completed: u32,
    pub spin_start_rotation: f64,
}

impl Default for WheelPhysicsState {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelPhysicsState {
    /// Wheel at rest at rotation 0
    pub fn new() -> Self {
        Self {
            angular_velocity: 0.0,
            rotation: 0.0,
            is_spinning: false,
            rotations_completed: 0,
            spin_start_rotation: 0.0,
        }
    }

    pub fn friction_tier(&self) -> FrictionTier {
        FrictionTier::select(self.angular_velocity, self.rotations_completed)
    }
}

/// Random launch velocity in [15, 30] rad/s
pub fn generate_spin_velocity<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(MIN_SPIN_VELOCITY..=MAX_SPIN_VELOCITY)
}

/// Begin a spin from the current resting angle
pub fn start_spin(state: WheelPhysicsState, initial_velocity: f64) -> WheelPhysicsState {
    let velocity = if initial_velocity.is_finite() {
        initial_velocity.max(0.0)
    } else {
        0.0
    };
    WheelPhysicsState {
        angular_velocity: velocity,
        rotation: state.rotation,
        is_spinning: true,
        rotations_completed: 0,
        spin_start_rotation: state.rotation,
    }
}

/// Advance the wheel by `dt` seconds. No-op when not spinning.
pub fn update_physics(state: WheelPhysicsState, dt: f64) -> WheelPhysicsState {
    if !state.is_spinning || !dt.is_finite() || dt <= 0.0 {
        return state;
    }

    let tier = state.friction_tier();
    let mut velocity = state.angular_velocity * tier.scale(dt);
    if state.rotations_completed < MIN_ROTATIONS {
        // Slow launches still owe the minimum number of turns
        velocity = velocity.max(SUSTAIN_VELOCITY);
    }

    let rotation = state.rotation + velocity * dt;
    let travelled = (rotation - state.spin_start_rotation) / TAU;
    let turns = travelled.floor().max(0.0) as u32;
    let rotations_completed = turns.max(state.rotations_completed);

    let mut next = WheelPhysicsState {
        angular_velocity: velocity,
        rotation,
        is_spinning: true,
        rotations_completed,
        spin_start_rotation: state.spin_start_rotation,
    };
    if velocity < STOP_VELOCITY && rotations_completed >= MIN_ROTATIONS {
        next.angular_velocity = 0.0;
        next.is_spinning = false;
    }
    next
}

/// Stop immediately. Used by hosts enforcing a wall-clock limit; outwardly
/// the same as a natural stop.
pub fn force_stop(state: WheelPhysicsState) -> WheelPhysicsState {
    WheelPhysicsState {
        angular_velocity: 0.0,
        is_spinning: false,
        ..state
    }
}

/// Index of the segment under the fixed pointer
///
/// Samples at segment centers (half-segment offset) and counts backwards,
/// since the wheel turns under the pointer. Returns 0 for an empty wheel.
pub fn calculate_landing_segment(rotation: f64, segment_count: usize) -> usize {
    if segment_count == 0 {
        return 0;
    }
    let rotation = if rotation.is_finite() { rotation } else { 0.0 };
    let segment_angle = TAU / segment_count as f64;
    let offset = normalize_rotation(normalize_rotation(rotation) + segment_angle / 2.0);
    let raw_index = (offset / segment_angle).floor() as usize;
    let raw_index = raw_index.min(segment_count - 1);
    (segment_count - raw_index) % segment_count
}

/// True whenever the segment under the pointer changed
#[inline]
pub fn is_tick(last_segment: Option<usize>, current_segment: usize) -> bool {
    last_segment.is_some_and(|last| last != current_segment)
}

/// Remembers the last segment seen so the host can fire one click per
/// boundary crossing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTracker {
    last_segment: Option<usize>,
}

impl TickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, current_segment: usize) -> bool {
        let tick = is_tick(self.last_segment, current_segment);
        self.last_segment = Some(current_segment);
        tick
    }

    pub fn reset(&mut self) {
        self.last_segment = None;
    }

    pub fn last_segment(&self) -> Option<usize> {
        self.last_segment
    }
}
