//! Fortune Wheel - gameplay engine for a wheel-spinning phrase guessing game
//!
//! Core modules:
//! - `sim`: Turn state machine, wheel physics, events (no rendering or platform code)
//! - `phrases`: Non-repeating, optionally weighted phrase selection
//! - `session`: Composition root wiring the components together
//! - `autoplay`: Demo player used by the headless runner
//! - `settings`: Data-driven configuration

pub mod autoplay;
pub mod error;
pub mod phrases;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{LoadError, SessionError, TurnError};
pub use phrases::{PhraseRecord, PhraseSelector, SelectedPhrase};
pub use session::{FrameReport, GameSession};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Cost of buying a vowel
    pub const VOWEL_COST: u32 = 250;

    /// Spin velocity range (rad/s)
    pub const MIN_SPIN_VELOCITY: f64 = 15.0;
    pub const MAX_SPIN_VELOCITY: f64 = 30.0;

    /// Friction is specified per frame at this rate
    pub const FRICTION_REFERENCE_FPS: f64 = 60.0;
    pub const FRICTION_NORMAL: f64 = 0.985;
    pub const FRICTION_FINAL: f64 = 0.99;
    pub const FRICTION_LOW_SPEED: f64 = 0.97;
    /// Below this velocity (rad/s) the final tier kicks in
    pub const FINAL_TIER_VELOCITY: f64 = 4.0;
    /// Below this velocity (rad/s) the low-speed tier kicks in
    pub const LOW_SPEED_TIER_VELOCITY: f64 = 2.0;

    /// Full rotations required before the wheel may stop
    pub const MIN_ROTATIONS: u32 = 3;
    /// Velocity floor (rad/s) while the minimum rotations are incomplete
    pub const SUSTAIN_VELOCITY: f64 = 2.0;
    /// Wheel is considered stopped below this velocity (rad/s)
    pub const STOP_VELOCITY: f64 = 0.001;

    /// Default host-side wall-clock limit for one spin (seconds)
    pub const SPIN_TIMEOUT_SECS: f64 = 15.0;
    /// Default frame step for headless simulation
    pub const FRAME_DT: f64 = 1.0 / 60.0;
}

/// Normalize a rotation to [0, 2π)
#[inline]
pub fn normalize_rotation(rotation: f64) -> f64 {
    use std::f64::consts::TAU;
    let r = rotation.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

/// Uppercase an ASCII letter, rejecting anything else
#[inline]
pub fn normalize_letter(letter: char) -> Option<char> {
    letter
        .is_ascii_alphabetic()
        .then(|| letter.to_ascii_uppercase())
}

/// Whether an (already normalized) letter is a vowel
#[inline]
pub fn is_vowel(letter: char) -> bool {
    matches!(letter, 'A' | 'E' | 'I' | 'O' | 'U')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(0.0), 0.0);
        assert!((normalize_rotation(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((normalize_rotation(-PI) - PI).abs() < 1e-12);
        assert!(normalize_rotation(-1e-18) < TAU);
    }

    #[test]
    fn test_letters() {
        assert_eq!(normalize_letter('q'), Some('Q'));
        assert_eq!(normalize_letter('7'), None);
        assert_eq!(normalize_letter('é'), None);
        assert!(is_vowel('E'));
        assert!(!is_vowel('Y'));
    }
}
