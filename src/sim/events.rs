//! Typed gameplay events and a small publish/subscribe bus
//!
//! Rendering, audio and save layers subscribe here instead of polling the
//! state. Handlers run synchronously inside `emit`, in subscription order.

use serde::{Deserialize, Serialize};

use super::state::GamePhase;

/// Why a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoseTurnReason {
    Bankrupt,
    LoseTurn,
    WrongGuess,
    WrongSolve,
}

/// Everything the turn state machine reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChange {
        previous_phase: GamePhase,
        new_phase: GamePhase,
    },
    ScoreChange {
        previous_score: u32,
        new_score: u32,
        delta: i64,
    },
    LetterGuessed {
        letter: char,
        is_correct: bool,
        count: u32,
        points_earned: u32,
        is_vowel: bool,
    },
    VowelPurchased {
        letter: char,
        cost: u32,
    },
    Bankrupt {
        lost_score: u32,
    },
    LoseTurn {
        reason: LoseTurnReason,
    },
    FreeSpinEarned {
        total_tokens: u32,
    },
    FreeSpinUsed {
        remaining_tokens: u32,
    },
    RoundWon {
        final_score: u32,
        phrase: String,
    },
    SolveAttempted {
        is_correct: bool,
        guess: String,
        actual_phrase: String,
    },
    TurnContinues,
    NewRound {
        phrase: String,
        category: String,
    },
}

/// Discriminant used to filter subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PhaseChange,
    ScoreChange,
    LetterGuessed,
    VowelPurchased,
    Bankrupt,
    LoseTurn,
    FreeSpinEarned,
    FreeSpinUsed,
    RoundWon,
    SolveAttempted,
    TurnContinues,
    NewRound,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::PhaseChange { .. } => EventKind::PhaseChange,
            GameEvent::ScoreChange { .. } => EventKind::ScoreChange,
            GameEvent::LetterGuessed { .. } => EventKind::LetterGuessed,
            GameEvent::VowelPurchased { .. } => EventKind::VowelPurchased,
            GameEvent::Bankrupt { .. } => EventKind::Bankrupt,
            GameEvent::LoseTurn { .. } => EventKind::LoseTurn,
            GameEvent::FreeSpinEarned { .. } => EventKind::FreeSpinEarned,
            GameEvent::FreeSpinUsed { .. } => EventKind::FreeSpinUsed,
            GameEvent::RoundWon { .. } => EventKind::RoundWon,
            GameEvent::SolveAttempted { .. } => EventKind::SolveAttempted,
            GameEvent::TurnContinues => EventKind::TurnContinues,
            GameEvent::NewRound { .. } => EventKind::NewRound,
        }
    }
}

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Handler = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: SubscriptionId,
    /// None = every event
    kind: Option<EventKind>,
    handler: Handler,
}

/// Synchronous publish/subscribe dispatcher
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }

    /// Receive events of one kind
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&GameEvent) + 'static,
    ) -> SubscriptionId {
        self.add(Some(kind), Box::new(handler))
    }

    /// Receive every event
    pub fn subscribe_all(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.add(None, Box::new(handler))
    }

    /// Returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn emit(&mut self, event: GameEvent) {
        let kind = event.kind();
        log::trace!("event {:?}", event);
        for sub in &mut self.subscriptions {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.handler)(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_filtered_subscription() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(EventKind::Bankrupt, move |e| sink.borrow_mut().push(e.clone()));

        bus.emit(GameEvent::TurnContinues);
        bus.emit(GameEvent::Bankrupt { lost_score: 500 });

        let expected = vec![GameEvent::Bankrupt { lost_score: 500 }];
        assert_eq!(*seen.borrow(), expected);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = bus.subscribe_all(move |_| *c.borrow_mut() += 1);

        bus.emit(GameEvent::TurnContinues);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(GameEvent::TurnContinues);

        assert_eq!(*count.borrow(), 1);
    }
}
