//! Error types
//!
//! Turn errors are expected input-validation failures. They are returned,
//! never panicked, and a rejected operation leaves state untouched.

use thiserror::Error;

/// Why a turn operation was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("spin the wheel before guessing a consonant")]
    CannotGuessYet,
    #[error("vowels can only be bought before spinning or while guessing")]
    CannotBuyVowel,
    #[error("not enough points to buy a vowel")]
    InsufficientFunds,
    #[error("letter has already been guessed")]
    LetterAlreadyGuessed,
    #[error("not a vowel")]
    NotAVowel,
    #[error("not a consonant")]
    NotAConsonant,
    #[error("cannot solve right now")]
    CannotSolveYet,
    #[error("round is already over")]
    RoundAlreadyOver,
    #[error("no free spin tokens")]
    NoFreeSpin,
}

impl TurnError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TurnError::AlreadySpinning => "ALREADY_SPINNING",
            TurnError::CannotGuessYet => "CANNOT_GUESS_YET",
            TurnError::CannotBuyVowel => "CANNOT_BUY_VOWEL",
            TurnError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            TurnError::LetterAlreadyGuessed => "LETTER_ALREADY_GUESSED",
            TurnError::NotAVowel => "NOT_A_VOWEL",
            TurnError::NotAConsonant => "NOT_A_CONSONANT",
            TurnError::CannotSolveYet => "CANNOT_SOLVE_YET",
            TurnError::RoundAlreadyOver => "ROUND_ALREADY_OVER",
            TurnError::NoFreeSpin => "NO_FREE_SPIN",
        }
    }
}

/// Failure loading settings or a phrase database
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure assembling a game session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("phrase database is empty")]
    NoPhrases,
    #[error("wheel layout has no wedges")]
    EmptyWheel,
    #[error(transparent)]
    Load(#[from] LoadError),
}
