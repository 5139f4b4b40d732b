//! Game session: the composition root
//!
//! Builds one of everything (phrase selector, wheel, turn machine, RNG) and
//! wires them together. The components never reference each other; the
//! session carries phrases into the machine and landing results out of the
//! wheel.

use rand_pcg::Pcg32;

use crate::error::{SessionError, TurnError};
use crate::phrases::{PhraseRecord, PhraseSelector, SelectedPhrase, builtin_phrases, load_phrases};
use crate::settings::Settings;
use crate::sim::{
    TickTracker, TurnStateMachine, WedgeResult, WheelLayout, WheelPhysicsState,
    calculate_landing_segment, force_stop, generate_spin_velocity, start_spin, update_physics,
};

/// PCG stream ids so wheel and phrase draws don't share a sequence
const WHEEL_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
const PHRASE_STREAM: u64 = 0x5851_f42d_4c95_7f2d;

/// What happened during one `advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Segment currently under the pointer
    pub segment: usize,
    /// Pointer crossed into a new segment this frame
    pub tick: bool,
    /// Wheel settled this frame
    pub landed: Option<WedgeResult>,
    /// Settled because the spin ran past the time limit
    pub forced: bool,
}

#[derive(Debug)]
pub struct GameSession {
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    selector: PhraseSelector<Pcg32>,
    layout: WheelLayout,
    wheel: WheelPhysicsState,
    ticks: TickTracker,
    spin_elapsed: f64,
    machine: TurnStateMachine,
}

impl GameSession {
    /// Build a session and draw the first puzzle
    pub fn new(settings: Settings, phrases: Vec<PhraseRecord>) -> Result<Self, SessionError> {
        let settings = settings.sanitized();
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut selector = PhraseSelector::new(phrases, Pcg32::new(seed, PHRASE_STREAM));
        if settings.weighted_categories {
            selector.set_category_weights(settings.category_weights.clone());
        }
        let first = selector
            .get_random_phrase(settings.category.as_deref())
            .ok_or(SessionError::NoPhrases)?;

        let machine = TurnStateMachine::with_vowel_cost(
            &first.record.phrase,
            &first.record.category,
            settings.vowel_cost,
        );
        log::info!("Session started with seed {}", seed);

        Ok(Self {
            settings,
            seed,
            rng: Pcg32::new(seed, WHEEL_STREAM),
            selector,
            layout: WheelLayout::standard(),
            wheel: WheelPhysicsState::new(),
            ticks: TickTracker::new(),
            spin_elapsed: 0.0,
            machine,
        })
    }

    /// Deterministic session with default settings
    pub fn seeded(seed: u64, phrases: Vec<PhraseRecord>) -> Result<Self, SessionError> {
        let settings = Settings {
            seed: Some(seed),
            ..Default::default()
        };
        Self::new(settings, phrases)
    }

    /// Build from settings alone, reading `phrases_path` or the bundled set
    pub fn from_settings(settings: Settings) -> Result<Self, SessionError> {
        let phrases = match &settings.phrases_path {
            Some(path) => load_phrases(std::path::Path::new(path))?,
            None => builtin_phrases()?,
        };
        Self::new(settings, phrases)
    }

    /// Swap in a different wheel layout
    pub fn with_layout(mut self, layout: WheelLayout) -> Result<Self, SessionError> {
        if layout.is_empty() {
            return Err(SessionError::EmptyWheel);
        }
        self.layout = layout;
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn machine(&self) -> &TurnStateMachine {
        &self.machine
    }

    /// Guesses, purchases and solves go straight to the machine
    pub fn machine_mut(&mut self) -> &mut TurnStateMachine {
        &mut self.machine
    }

    pub fn wheel(&self) -> &WheelPhysicsState {
        &self.wheel
    }

    pub fn layout(&self) -> &WheelLayout {
        &self.layout
    }

    pub fn selector(&self) -> &PhraseSelector<Pcg32> {
        &self.selector
    }

    pub fn current_segment(&self) -> usize {
        calculate_landing_segment(self.wheel.rotation, self.layout.len())
    }

    /// Launch the wheel
    pub fn spin(&mut self) -> Result<(), TurnError> {
        self.machine.start_spin()?;
        let velocity = generate_spin_velocity(&mut self.rng);
        self.wheel = start_spin(self.wheel, velocity);
        self.spin_elapsed = 0.0;
        self.ticks.reset();
        self.ticks.observe(self.current_segment());
        log::debug!("Spin launched at {:.2} rad/s", velocity);
        Ok(())
    }

    /// Step the wheel by `dt` seconds
    ///
    /// Safe to call every frame; nothing moves unless a spin is in progress.
    pub fn advance(&mut self, dt: f64) -> FrameReport {
        if !self.wheel.is_spinning {
            return FrameReport {
                segment: self.current_segment(),
                ..Default::default()
            };
        }

        self.wheel = update_physics(self.wheel, dt);
        if dt.is_finite() && dt > 0.0 {
            self.spin_elapsed += dt;
        }

        let mut forced = false;
        if self.wheel.is_spinning && self.spin_elapsed >= self.settings.spin_timeout_secs {
            log::warn!(
                "Spin exceeded {:.1}s at {:.3} rad/s, forcing stop",
                self.settings.spin_timeout_secs,
                self.wheel.angular_velocity
            );
            self.wheel = force_stop(self.wheel);
            forced = true;
        }

        let segment = self.current_segment();
        let tick = self.ticks.observe(segment);
        if tick {
            log::trace!("tick: segment {}", segment);
        }

        let landed = if self.wheel.is_spinning {
            None
        } else {
            self.layout.result_for_segment(segment)
        };
        if let Some(result) = landed {
            log::debug!(
                "Wheel settled on segment {} after {} rotations: {:?}",
                segment,
                self.wheel.rotations_completed,
                result
            );
            self.machine.wheel_stopped(result);
        }

        FrameReport {
            segment,
            tick,
            landed,
            forced,
        }
    }

    /// Spin and step at `settings.frame_dt` until the wheel settles
    pub fn spin_until_stopped(&mut self) -> Result<WedgeResult, TurnError> {
        self.spin()?;
        let dt = self.settings.frame_dt;
        loop {
            if let Some(result) = self.advance(dt).landed {
                return Ok(result);
            }
        }
    }

    /// Halt a spin that belongs to the round being replaced. Its landing is
    /// discarded, never reported.
    fn abandon_spin(&mut self) {
        if self.wheel.is_spinning {
            log::debug!(
                "Abandoning spin at {:.3} rad/s",
                self.wheel.angular_velocity
            );
            self.wheel = force_stop(self.wheel);
        }
        self.spin_elapsed = 0.0;
        self.ticks.reset();
    }

    /// Next puzzle, keeping score. `None` when the database has nothing to
    /// offer; the current round is left as is.
    pub fn next_round(&mut self) -> Option<SelectedPhrase> {
        let selected = self
            .selector
            .get_random_phrase(self.settings.category.as_deref())?;
        self.abandon_spin();
        self.machine.new_round(&selected.record.phrase, &selected.record.category);
        Some(selected)
    }

    /// Fresh game: selection history, score and tokens all reset
    pub fn new_game(&mut self) -> Option<SelectedPhrase> {
        self.selector.reset_session();
        let selected = self
            .selector
            .get_random_phrase(self.settings.category.as_deref())?;
        self.abandon_spin();
        self.machine.reset_game(
            Some(&selected.record.phrase),
            Some(&selected.record.category),
        );
        Some(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GamePhase, Wedge, WedgeKind};

    fn phrases() -> Vec<PhraseRecord> {
        vec![
            PhraseRecord::new("Wrong Hole Buddy", "Phrase"),
            PhraseRecord::new("Giant Panda", "Animal"),
            PhraseRecord::new("Eiffel Tower", "Place"),
        ]
    }

    #[test]
    fn test_empty_database_is_an_error() {
        assert!(matches!(
            GameSession::seeded(1, Vec::new()),
            Err(SessionError::NoPhrases)
        ));
    }

    #[test]
    fn test_spin_settles_and_reaches_machine() {
        let mut session = GameSession::seeded(42, phrases()).unwrap();
        let result = session.spin_until_stopped().unwrap();

        assert!(!session.wheel().is_spinning);
        assert!(session.wheel().rotations_completed >= 3);
        let segment = session.current_segment();
        assert_eq!(session.layout().result_for_segment(segment), Some(result));
        let expected = match result.kind {
            WedgeKind::Points => GamePhase::Guessing,
            _ => GamePhase::Idle,
        };
        assert_eq!(session.machine().phase(), expected);
    }

    #[test]
    fn test_same_seed_same_spin() {
        let mut a = GameSession::seeded(7, phrases()).unwrap();
        let mut b = GameSession::seeded(7, phrases()).unwrap();
        assert_eq!(a.machine().state().phrase, b.machine().state().phrase);
        assert_eq!(a.spin_until_stopped(), b.spin_until_stopped());
        assert_eq!(a.wheel(), b.wheel());
    }

    #[test]
    fn test_ticks_fire_during_spin() {
        let mut session = GameSession::seeded(3, phrases()).unwrap();
        session.spin().unwrap();
        let mut ticks = 0;
        let dt = session.settings().frame_dt;
        loop {
            let report = session.advance(dt);
            if report.tick {
                ticks += 1;
            }
            if report.landed.is_some() {
                break;
            }
        }
        // Three full turns cross 72 boundaries, at most two per frame at top speed
        assert!(ticks >= 36, "only {} ticks", ticks);
    }

    #[test]
    fn test_timeout_forces_stop() {
        let settings = Settings {
            seed: Some(5),
            spin_timeout_secs: 0.5,
            ..Default::default()
        };
        let mut session = GameSession::new(settings, phrases()).unwrap();
        session.spin().unwrap();
        let mut report = FrameReport::default();
        for _ in 0..60 {
            report = session.advance(1.0 / 60.0);
            if report.landed.is_some() {
                break;
            }
        }
        assert!(report.forced);
        assert!(report.landed.is_some());
        assert_eq!(session.wheel().angular_velocity, 0.0);
        assert_ne!(session.machine().phase(), GamePhase::Spinning);
    }

    #[test]
    fn test_spin_rejected_while_guessing() {
        let layout = WheelLayout {
            wedges: vec![Wedge {
                id: 0,
                kind: WedgeKind::Points,
                value: 500,
            }],
        };
        let mut session = GameSession::seeded(9, phrases())
            .unwrap()
            .with_layout(layout)
            .unwrap();
        session.spin_until_stopped().unwrap();
        assert_eq!(session.machine().phase(), GamePhase::Guessing);
        assert_eq!(session.spin(), Err(TurnError::AlreadySpinning));
        // Idle frames are harmless
        assert_eq!(session.advance(1.0 / 60.0).landed, None);
    }

    #[test]
    fn test_empty_layout_rejected() {
        let session = GameSession::seeded(9, phrases()).unwrap();
        assert!(matches!(
            session.with_layout(WheelLayout { wedges: Vec::new() }),
            Err(SessionError::EmptyWheel)
        ));
    }

    #[test]
    fn test_round_change_mid_spin_drops_the_landing() {
        let mut session = GameSession::seeded(13, phrases()).unwrap();
        session.spin().unwrap();
        for _ in 0..5 {
            session.advance(1.0 / 60.0);
        }
        assert!(session.wheel().is_spinning);

        session.next_round().unwrap();
        assert!(!session.wheel().is_spinning);
        assert_eq!(session.machine().phase(), GamePhase::Idle);
        let report = session.advance(1.0 / 60.0);
        assert_eq!(report.landed, None);
        assert!(!report.tick);

        // Same for a fresh game
        session.spin().unwrap();
        session.advance(1.0 / 60.0);
        session.new_game().unwrap();
        assert!(!session.wheel().is_spinning);
        assert_eq!(session.advance(1.0 / 60.0).landed, None);

        // The new round spins and lands normally
        let result = session.spin_until_stopped().unwrap();
        assert_eq!(session.machine().state().current_wedge, Some(result));
    }

    #[test]
    fn test_rounds_do_not_repeat_phrases() {
        let mut session = GameSession::seeded(11, phrases()).unwrap();
        let mut seen = vec![session.machine().state().phrase.clone()];
        for _ in 0..2 {
            let next = session.next_round().unwrap();
            let phrase = next.record.phrase.to_uppercase();
            assert!(!seen.contains(&phrase));
            seen.push(phrase);
        }
        assert!(session.selector().is_exhausted());

        assert!(session.new_game().is_some());
        assert_eq!(session.selector().get_remaining_count(None), 2);
    }
}
