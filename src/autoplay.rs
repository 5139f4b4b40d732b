//! Demo player
//!
//! Picks the next move from a state snapshot so the headless runner (and
//! tests) can play whole rounds. It guesses letters in English frequency
//! order and solves once most of the board is showing.

use crate::error::TurnError;
use crate::session::GameSession;
use crate::sim::{GamePhase, GameState};

/// Consonants, most common first
const CONSONANT_ORDER: &str = "TNSHRDLCMWFGYPBVKJXQZ";
/// Vowels, most common first
const VOWEL_ORDER: &str = "EAOIU";
/// Fraction of distinct letters that must show before solving
const SOLVE_THRESHOLD: f64 = 0.7;

/// A player action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Spin,
    GuessConsonant(char),
    BuyVowel(char),
    Solve(String),
    /// Wheel is still turning
    Wait,
    /// Round is over
    Done,
}

fn next_unguessed(state: &GameState, order: &str) -> Option<char> {
    order.chars().find(|&c| !state.guessed.contains(c))
}

/// Decide what to do next
pub fn choose_move(state: &GameState, vowel_cost: u32) -> Move {
    let (revealed, total) = state.reveal_progress();
    let ready_to_solve = total == 0 || revealed as f64 >= total as f64 * SOLVE_THRESHOLD;

    match state.phase {
        GamePhase::RoundOver => Move::Done,
        GamePhase::Spinning => Move::Wait,
        GamePhase::Guessing => match next_unguessed(state, CONSONANT_ORDER) {
            Some(c) => Move::GuessConsonant(c),
            None => Move::Solve(state.phrase.clone()),
        },
        GamePhase::Idle | GamePhase::BuyingVowel | GamePhase::Solving => {
            if ready_to_solve {
                return Move::Solve(state.phrase.clone());
            }
            let vowel = next_unguessed(state, VOWEL_ORDER);
            if let Some(v) = vowel.filter(|_| state.score >= vowel_cost) {
                return Move::BuyVowel(v);
            }
            if next_unguessed(state, CONSONANT_ORDER).is_none() {
                // Nothing left to spin for
                return Move::Solve(state.phrase.clone());
            }
            Move::Spin
        }
    }
}

/// How a played round ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub phrase: String,
    pub category: String,
    pub won: bool,
    pub score: u32,
    pub spins: u32,
    pub moves: u32,
}

/// Play the current round until it is won or `max_moves` is reached
pub fn play_round(session: &mut GameSession, max_moves: u32) -> Result<RoundSummary, TurnError> {
    let mut spins = 0;
    let mut moves = 0;

    while moves < max_moves {
        let state = session.machine().state();
        let mv = choose_move(state, session.machine().vowel_cost());
        log::debug!("[{}] {:?}", state.masked_phrase(), mv);
        match mv {
            Move::Done => break,
            Move::Wait => {
                session.advance(session.settings().frame_dt);
                continue;
            }
            Move::Spin => {
                let result = session.spin_until_stopped()?;
                log::info!("Spin landed on {:?} {}", result.kind, result.value);
                spins += 1;
            }
            Move::GuessConsonant(c) => {
                let r = session.machine_mut().guess_consonant(c)?;
                log::info!("Guessed {}: {} found, +{}", c, r.count, r.points_earned);
            }
            Move::BuyVowel(v) => {
                let r = session.machine_mut().buy_vowel(v)?;
                log::info!("Bought {}: {} found", v, r.count);
            }
            Move::Solve(guess) => {
                let r = session.machine_mut().attempt_solve(&guess)?;
                log::info!("Solve attempt {:?}: {}", r.guess, r.is_correct);
            }
        }
        moves += 1;
    }

    let state = session.machine().state();
    Ok(RoundSummary {
        phrase: state.phrase.clone(),
        category: state.category.clone(),
        won: state.has_won,
        score: state.score,
        spins,
        moves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrases::PhraseRecord;

    #[test]
    fn test_choose_move_by_phase() {
        let mut state = GameState::new("WRONG HOLE BUDDY", "Phrase");
        assert_eq!(choose_move(&state, 250), Move::Spin);

        state.score = 300;
        assert_eq!(choose_move(&state, 250), Move::BuyVowel('E'));

        state.phase = GamePhase::Guessing;
        assert_eq!(choose_move(&state, 250), Move::GuessConsonant('T'));
        state.guessed.insert('T');
        assert_eq!(choose_move(&state, 250), Move::GuessConsonant('N'));

        state.phase = GamePhase::Spinning;
        assert_eq!(choose_move(&state, 250), Move::Wait);
        state.phase = GamePhase::RoundOver;
        assert_eq!(choose_move(&state, 250), Move::Done);
    }

    #[test]
    fn test_solves_when_mostly_revealed() {
        let mut state = GameState::new("WRONG HOLE BUDDY", "Phrase");
        for c in "WRONGHLEB".chars() {
            state.guessed.insert(c);
        }
        let expected = Move::Solve("WRONG HOLE BUDDY".into());
        assert_eq!(choose_move(&state, 250), expected);
    }

    #[test]
    fn test_plays_a_round_to_a_win() {
        let phrases = vec![PhraseRecord::new("Wrong Hole Buddy", "Phrase")];
        let mut session = GameSession::seeded(2024, phrases).unwrap();
        let summary = play_round(&mut session, 500).unwrap();
        assert!(summary.won);
        assert_eq!(summary.phrase, "WRONG HOLE BUDDY");
        assert!(summary.spins > 0);
        assert_eq!(session.machine().phase(), GamePhase::RoundOver);
    }
}
