//! Decision loop state machine.
//!
//! Tracks where the current poll iteration is in the card flow and rejects
//! any step that skips a stage.
//!
//! # States
//!
//! - `Idle`: no card engaged
//! - `CardDetected`: the reader sensed a card in the field
//! - `CardSelected`: the card's serial number was read
//! - `Authorized`: the serial matched the configured identifier
//! - `Unauthorized`: the serial did not match
//!
//! # Valid Transitions
//!
//! - Idle → CardDetected → CardSelected → Authorized/Unauthorized → Idle
//! - CardDetected → Idle (serial read failed)
//!
//! An empty poll (Idle → Idle) records nothing.
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//! use latchkey_firmware::{AccessState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! let now = Instant::now();
//! machine.transition_to(AccessState::CardDetected, now).unwrap();
//! machine.transition_to(AccessState::CardSelected, now).unwrap();
//! assert!(machine.transition_to(AccessState::Idle, now).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use latchkey_core::constants::MAX_TRANSITION_HISTORY;
use latchkey_core::{Error, Result};

/// Stage of one decision loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessState {
    /// No card engaged.
    Idle,

    /// Card presence sensed, serial not yet read.
    CardDetected,

    /// Serial read, reader session open.
    CardSelected,

    /// Identifier matched; granted response issued.
    Authorized,

    /// Identifier did not match; denied response issued.
    Unauthorized,
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AccessState::Idle => "Idle",
            AccessState::CardDetected => "CardDetected",
            AccessState::CardSelected => "CardSelected",
            AccessState::Authorized => "Authorized",
            AccessState::Unauthorized => "Unauthorized",
        };
        write!(f, "{}", state_str)
    }
}

impl AccessState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_firmware::AccessState;
    ///
    /// assert!(AccessState::Idle.can_transition_to(&AccessState::CardDetected));
    /// assert!(!AccessState::Idle.can_transition_to(&AccessState::Authorized));
    /// ```
    pub fn can_transition_to(&self, target: &AccessState) -> bool {
        matches!(
            (self, target),
            (AccessState::Idle, AccessState::CardDetected)
                | (AccessState::CardDetected, AccessState::CardSelected | AccessState::Idle)
                | (AccessState::CardSelected, AccessState::Authorized | AccessState::Unauthorized)
                | (AccessState::Authorized | AccessState::Unauthorized, AccessState::Idle)
        )
    }

    /// Whether this state ends an iteration with a decision.
    pub fn is_outcome(&self) -> bool {
        matches!(self, AccessState::Authorized | AccessState::Unauthorized)
    }
}

/// A single state transition with timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: AccessState,

    /// The state transitioned to.
    pub to: AccessState,

    /// When the transition occurred, on the loop's clock.
    pub timestamp: Instant,
}

impl StateTransition {
    /// Create a new state transition record.
    pub fn new(from: AccessState, to: AccessState, timestamp: Instant) -> Self {
        Self {
            from,
            to,
            timestamp,
        }
    }
}

/// State machine for the card decision flow.
///
/// Keeps a bounded history of recent transitions for diagnostics.
#[derive(Debug)]
pub struct StateMachine {
    current_state: AccessState,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self {
            current_state: AccessState::Idle,
            history: VecDeque::with_capacity(MAX_TRANSITION_HISTORY),
        }
    }

    /// Get the current state of the machine.
    pub fn current_state(&self) -> &AccessState {
        &self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N state transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .copied()
            .collect()
    }

    /// Transition to a new state at `now`, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the requested transition
    /// is not valid for the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: AccessState, now: Instant) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state, now);
        self.perform_state_change(transition);
        Ok(transition)
    }

    /// Force the machine back to Idle regardless of current state.
    ///
    /// Used to recover an iteration that failed part-way.
    pub fn reset(&mut self, now: Instant) -> StateTransition {
        let transition = StateTransition::new(self.current_state, AccessState::Idle, now);
        self.perform_state_change(transition);
        transition
    }

    fn perform_state_change(&mut self, transition: StateTransition) {
        self.current_state = transition.to;
        self.history.push_back(transition);
        if self.history.len() > MAX_TRANSITION_HISTORY {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
