//! Game state and core value types
//!
//! Everything a host needs to render a round lives here. The state machine
//! owns the only mutable copy; hosts see it by shared reference or clone.

use serde::{Deserialize, Serialize};

use crate::{is_vowel, normalize_letter};

/// Current phase of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to spin, buy a vowel or solve
    #[default]
    Idle,
    /// Wheel is in motion
    Spinning,
    /// Landed on points, waiting for a consonant
    Guessing,
    /// Host-side transient phase while a vowel is chosen
    BuyingVowel,
    /// Host-side transient phase while a solve is typed
    Solving,
    /// Puzzle solved
    RoundOver,
}

/// What a wedge does when the wheel lands on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WedgeKind {
    Points,
    Bankrupt,
    LoseTurn,
    FreeSpin,
}

/// Outcome of a settled spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WedgeResult {
    pub kind: WedgeKind,
    /// Points per matching consonant (0 for non-point wedges)
    pub value: u32,
    pub wedge_id: u32,
}

impl WedgeResult {
    pub fn points(value: u32, wedge_id: u32) -> Self {
        Self {
            kind: WedgeKind::Points,
            value,
            wedge_id,
        }
    }

    pub fn special(kind: WedgeKind, wedge_id: u32) -> Self {
        Self {
            kind,
            value: 0,
            wedge_id,
        }
    }
}

#[inline]
fn bit(letter: char) -> u32 {
    1 << (letter as u32 - 'A' as u32)
}

fn mask_letters(mask: u32) -> impl Iterator<Item = char> {
    ('A'..='Z').filter(move |&c| mask & bit(c) != 0)
}

/// Letters guessed this round, one 26-bit mask per letter class
///
/// Vowels and consonants are kept apart so the two sets are disjoint by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuessedLetters {
    consonants: u32,
    vowels: u32,
}

impl GuessedLetters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a letter (any case) was already guessed
    pub fn contains(&self, letter: char) -> bool {
        match normalize_letter(letter) {
            Some(c) => (self.consonants | self.vowels) & bit(c) != 0,
            None => false,
        }
    }

    /// Record a letter in the class it belongs to. Returns false for
    /// non-letters and repeats.
    pub fn insert(&mut self, letter: char) -> bool {
        let Some(c) = normalize_letter(letter) else {
            return false;
        };
        if self.contains(c) {
            return false;
        }
        if is_vowel(c) {
            self.vowels |= bit(c);
        } else {
            self.consonants |= bit(c);
        }
        true
    }

    pub fn consonants(&self) -> impl Iterator<Item = char> {
        mask_letters(self.consonants)
    }

    pub fn vowels(&self) -> impl Iterator<Item = char> {
        mask_letters(self.vowels)
    }

    /// Union of both classes
    pub fn all(&self) -> impl Iterator<Item = char> {
        mask_letters(self.consonants | self.vowels)
    }

    pub fn len(&self) -> usize {
        (self.consonants.count_ones() + self.vowels.count_ones()) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.consonants == 0 && self.vowels == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete state of one round (score and tokens carry across rounds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    /// Result of the most recent spin this turn
    pub current_wedge: Option<WedgeResult>,
    pub guessed: GuessedLetters,
    pub free_spin_tokens: u32,
    pub has_won: bool,
    /// Puzzle text, uppercase
    pub phrase: String,
    pub category: String,
}

impl GameState {
    pub fn new(phrase: &str, category: &str) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            current_wedge: None,
            guessed: GuessedLetters::new(),
            free_spin_tokens: 0,
            has_won: false,
            phrase: phrase.to_uppercase(),
            category: category.to_string(),
        }
    }

    /// Occurrences of a letter in the phrase
    pub fn count_letter(&self, letter: char) -> u32 {
        match normalize_letter(letter) {
            Some(c) => self
                .phrase
                .chars()
                .filter(|&p| p.to_ascii_uppercase() == c)
                .count() as u32,
            None => 0,
        }
    }

    /// Every A-Z letter of the phrase has been guessed
    pub fn is_solved(&self) -> bool {
        self.phrase
            .chars()
            .filter_map(normalize_letter)
            .all(|c| self.guessed.contains(c))
    }

    /// Phrase with unguessed letters replaced by `_`
    pub fn masked_phrase(&self) -> String {
        self.phrase
            .chars()
            .map(|c| match normalize_letter(c) {
                Some(l) if !self.guessed.contains(l) => '_',
                _ => c,
            })
            .collect()
    }

    /// Distinct letters in the phrase and how many of them are revealed
    pub fn reveal_progress(&self) -> (usize, usize) {
        let mut letters = GuessedLetters::new();
        for c in self.phrase.chars() {
            letters.insert(c);
        }
        let revealed = letters.all().filter(|&c| self.guessed.contains(c)).count();
        (revealed, letters.len())
    }
}
