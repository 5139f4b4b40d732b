//! Turn state machine
//!
//! Guards every phase transition, keeps score, and tracks guessed letters.
//! The machine never sees the wheel or the phrase database: the host hands it
//! a phrase per round and a `WedgeResult` per spin.
//!
//! Every accepted operation emits events through the owned `EventBus`. A
//! rejected operation returns `Err` and touches nothing.

use serde::{Deserialize, Serialize};

use super::events::{EventBus, EventKind, GameEvent, LoseTurnReason, SubscriptionId};
use super::state::{GamePhase, GameState, WedgeKind, WedgeResult};
use crate::consts::VOWEL_COST;
use crate::error::TurnError;
use crate::{is_vowel, normalize_letter};

/// Outcome of a consonant guess or vowel purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub letter: char,
    pub is_correct: bool,
    pub count: u32,
    pub points_earned: u32,
    pub is_vowel: bool,
}

/// Outcome of a solve attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    pub is_correct: bool,
    /// Guess after normalization
    pub guess: String,
    pub actual_phrase: String,
}

/// Uppercase, drop everything but letters and spaces, collapse whitespace
pub fn normalize_solve_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug)]
pub struct TurnStateMachine {
    state: GameState,
    events: EventBus,
    vowel_cost: u32,
}

impl TurnStateMachine {
    pub fn new(phrase: &str, category: &str) -> Self {
        Self::with_vowel_cost(phrase, category, VOWEL_COST)
    }

    pub fn with_vowel_cost(phrase: &str, category: &str, vowel_cost: u32) -> Self {
        Self {
            state: GameState::new(phrase, category),
            events: EventBus::new(),
            vowel_cost,
        }
    }

    /// Read-only view of the current state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn vowel_cost(&self) -> u32 {
        self.vowel_cost
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn masked_phrase(&self) -> String {
        self.state.masked_phrase()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&GameEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    pub fn subscribe_all(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.events.subscribe_all(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // --- internal transitions ---

    fn set_phase(&mut self, new_phase: GamePhase) {
        let previous_phase = self.state.phase;
        if previous_phase == new_phase {
            return;
        }
        self.state.phase = new_phase;
        log::debug!("phase {:?} -> {:?}", previous_phase, new_phase);
        self.events.emit(GameEvent::PhaseChange {
            previous_phase,
            new_phase,
        });
    }

    fn set_score(&mut self, new_score: u32) {
        let previous_score = self.state.score;
        if previous_score == new_score {
            return;
        }
        self.state.score = new_score;
        self.events.emit(GameEvent::ScoreChange {
            previous_score,
            new_score,
            delta: i64::from(new_score) - i64::from(previous_score),
        });
    }

    fn lose_turn(&mut self, reason: LoseTurnReason) {
        log::debug!("turn lost: {:?}", reason);
        self.events.emit(GameEvent::LoseTurn { reason });
        self.set_phase(GamePhase::Idle);
    }

    fn win(&mut self) {
        self.state.has_won = true;
        self.set_phase(GamePhase::RoundOver);
        log::info!(
            "round won with {} points: {}",
            self.state.score,
            self.state.phrase
        );
        self.events.emit(GameEvent::RoundWon {
            final_score: self.state.score,
            phrase: self.state.phrase.clone(),
        });
    }

    // --- guarded operations ---

    pub fn start_spin(&mut self) -> Result<(), TurnError> {
        if self.state.has_won {
            return Err(TurnError::RoundAlreadyOver);
        }
        if self.state.phase != GamePhase::Idle {
            return Err(TurnError::AlreadySpinning);
        }
        self.state.current_wedge = None;
        self.set_phase(GamePhase::Spinning);
        Ok(())
    }

    /// Apply a settled spin. Ignored unless a spin is in progress.
    pub fn wheel_stopped(&mut self, result: WedgeResult) {
        if self.state.phase != GamePhase::Spinning {
            log::warn!(
                "wheel_stopped({:?}) ignored in phase {:?}",
                result,
                self.state.phase
            );
            return;
        }
        self.state.current_wedge = Some(result);

        match result.kind {
            WedgeKind::Points => self.set_phase(GamePhase::Guessing),
            WedgeKind::Bankrupt => {
                let lost_score = self.state.score;
                self.set_score(0);
                self.events.emit(GameEvent::Bankrupt { lost_score });
                self.lose_turn(LoseTurnReason::Bankrupt);
            }
            WedgeKind::LoseTurn => self.lose_turn(LoseTurnReason::LoseTurn),
            WedgeKind::FreeSpin => {
                self.state.free_spin_tokens += 1;
                self.events.emit(GameEvent::FreeSpinEarned {
                    total_tokens: self.state.free_spin_tokens,
                });
                self.set_phase(GamePhase::Idle);
            }
        }
    }

    pub fn guess_consonant(&mut self, letter: char) -> Result<GuessResult, TurnError> {
        if self.state.phase != GamePhase::Guessing {
            return Err(TurnError::CannotGuessYet);
        }
        let letter = match normalize_letter(letter) {
            Some(c) if !is_vowel(c) => c,
            _ => return Err(TurnError::NotAConsonant),
        };
        if self.state.guessed.contains(letter) {
            return Err(TurnError::LetterAlreadyGuessed);
        }

        self.state.guessed.insert(letter);
        let count = self.state.count_letter(letter);
        let wedge_value = self.state.current_wedge.map_or(0, |w| w.value);
        let points_earned = wedge_value.saturating_mul(count);
        let result = GuessResult {
            letter,
            is_correct: count > 0,
            count,
            points_earned,
            is_vowel: false,
        };

        if count > 0 {
            self.set_score(self.state.score.saturating_add(points_earned));
            self.emit_guess(&result);
            if self.state.is_solved() {
                self.win();
            } else {
                self.events.emit(GameEvent::TurnContinues);
                self.set_phase(GamePhase::Idle);
            }
        } else {
            self.emit_guess(&result);
            self.lose_turn(LoseTurnReason::WrongGuess);
        }
        Ok(result)
    }

    /// Buy a vowel. The cost is paid whether or not the vowel appears, and a
    /// miss does not end the turn.
    pub fn buy_vowel(&mut self, letter: char) -> Result<GuessResult, TurnError> {
        if !matches!(self.state.phase, GamePhase::Guessing | GamePhase::Idle) {
            return Err(TurnError::CannotBuyVowel);
        }
        let letter = match normalize_letter(letter) {
            Some(c) if is_vowel(c) => c,
            _ => return Err(TurnError::NotAVowel),
        };
        if self.state.guessed.contains(letter) {
            return Err(TurnError::LetterAlreadyGuessed);
        }
        if self.state.score < self.vowel_cost {
            return Err(TurnError::InsufficientFunds);
        }

        self.state.guessed.insert(letter);
        self.set_score(self.state.score - self.vowel_cost);
        self.events.emit(GameEvent::VowelPurchased {
            letter,
            cost: self.vowel_cost,
        });

        let count = self.state.count_letter(letter);
        let result = GuessResult {
            letter,
            is_correct: count > 0,
            count,
            points_earned: 0,
            is_vowel: true,
        };
        self.emit_guess(&result);

        if self.state.is_solved() {
            self.win();
        } else {
            self.set_phase(GamePhase::Idle);
        }
        Ok(result)
    }

    pub fn attempt_solve(&mut self, guess: &str) -> Result<SolveResult, TurnError> {
        if self.state.has_won {
            return Err(TurnError::RoundAlreadyOver);
        }
        if !matches!(self.state.phase, GamePhase::Guessing | GamePhase::Idle) {
            return Err(TurnError::CannotSolveYet);
        }

        let normalized_guess = normalize_solve_text(guess);
        let is_correct = normalized_guess == normalize_solve_text(&self.state.phrase);
        let result = SolveResult {
            is_correct,
            guess: normalized_guess,
            actual_phrase: self.state.phrase.clone(),
        };
        self.events.emit(GameEvent::SolveAttempted {
            is_correct,
            guess: result.guess.clone(),
            actual_phrase: result.actual_phrase.clone(),
        });

        if is_correct {
            // Reveal the board so the win condition and the state agree
            let letters: Vec<char> = self.state.phrase.chars().collect();
            for c in letters {
                self.state.guessed.insert(c);
            }
            self.win();
        } else {
            self.lose_turn(LoseTurnReason::WrongSolve);
        }
        Ok(result)
    }

    /// Spend a free spin token. Returns the tokens left.
    ///
    /// This only returns the machine to `Idle`; the host still calls
    /// `start_spin` for the extra spin.
    pub fn use_free_spin(&mut self) -> Result<u32, TurnError> {
        if self.state.has_won {
            return Err(TurnError::RoundAlreadyOver);
        }
        if self.state.phase == GamePhase::Spinning {
            return Err(TurnError::AlreadySpinning);
        }
        if self.state.free_spin_tokens == 0 {
            return Err(TurnError::NoFreeSpin);
        }
        self.state.free_spin_tokens -= 1;
        let remaining_tokens = self.state.free_spin_tokens;
        self.events.emit(GameEvent::FreeSpinUsed { remaining_tokens });
        self.set_phase(GamePhase::Idle);
        Ok(remaining_tokens)
    }

    // --- round lifecycle ---

    /// Start a new round; score and free spin tokens carry over
    pub fn new_round(&mut self, phrase: &str, category: &str) {
        self.state.guessed.clear();
        self.state.current_wedge = None;
        self.state.has_won = false;
        self.set_phase(GamePhase::Idle);
        self.replace_phrase(phrase, category);
    }

    /// Swap the puzzle of the current round without touching letters,
    /// score or phase
    pub fn set_phrase(&mut self, phrase: &str, category: &str) {
        self.replace_phrase(phrase, category);
    }

    /// Back to a fresh game. `None` keeps the current phrase/category.
    pub fn reset_game(&mut self, phrase: Option<&str>, category: Option<&str>) {
        let phrase = phrase.unwrap_or(&self.state.phrase).to_string();
        let category = category.unwrap_or(&self.state.category).to_string();
        self.set_score(0);
        self.state.free_spin_tokens = 0;
        self.new_round(&phrase, &category);
    }

    fn replace_phrase(&mut self, phrase: &str, category: &str) {
        self.state.phrase = phrase.to_uppercase();
        self.state.category = category.to_string();
        log::info!(
            "new puzzle [{}]: {} letters",
            self.state.category,
            self.state.reveal_progress().1
        );
        self.events.emit(GameEvent::NewRound {
            phrase: self.state.phrase.clone(),
            category: self.state.category.clone(),
        });
    }

    fn emit_guess(&mut self, result: &GuessResult) {
        self.events.emit(GameEvent::LetterGuessed {
            letter: result.letter,
            is_correct: result.is_correct,
            count: result.count,
            points_earned: result.points_earned,
            is_vowel: result.is_vowel,
        });
    }
}
