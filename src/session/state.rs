//! Presentation state as a small, pure state machine.
//!
//! Every change goes through [`transition`]: `(state, event) -> (state, effect)`.
//! Results and errors are replaced wholesale, never merged.

use crate::error::{AnalysisError, FailureKind};
use crate::health::{HealthInformationResult, SymptomQuery};

/// Why a submission was refused at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    Busy,
}

/// A failed analysis as the presentation layer keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Developer-facing detail. Not shown to the user verbatim.
    pub diagnostic: String,
}

impl From<&AnalysisError> for Failure {
    fn from(e: &AnalysisError) -> Self {
        Self {
            kind: e.kind(),
            diagnostic: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub input: String,
    pub result: Option<HealthInformationResult>,
    pub error: Option<Failure>,
    pub busy: bool,
    /// Bumped on every submit and reset; completions carry the value they
    /// were issued under.
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Replace the input text.
    Edit(String),
    /// A clarifying question was picked: append it to the input.
    QuestionPicked(String),
    Submit,
    Succeeded {
        generation: u64,
        result: HealthInformationResult,
    },
    Failed {
        generation: u64,
        failure: Failure,
    },
    /// Start over.
    Reset,
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Issue exactly one outbound call for this query.
    Dispatch {
        generation: u64,
        query: SymptomQuery,
    },
    Rejected(Rejection),
    /// A completion arrived for a generation that is no longer current.
    Stale,
    /// An outstanding call must be abandoned.
    Cancel,
}

/// Append a picked question, keeping a single space between pieces and
/// leaving a trailing space for the user to keep typing.
pub fn append_question(input: &str, question: &str) -> String {
    let mut out = String::with_capacity(input.len() + question.len() + 2);
    out.push_str(input);
    if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
    out.push_str(question);
    out.push(' ');
    out
}

pub fn transition(state: SessionState, event: Event) -> (SessionState, Effect) {
    match event {
        Event::Edit(input) => (SessionState { input, ..state }, Effect::None),

        Event::QuestionPicked(question) => {
            let input = append_question(&state.input, &question);
            (SessionState { input, ..state }, Effect::None)
        }

        Event::Submit => {
            if state.busy {
                return (state, Effect::Rejected(Rejection::Busy));
            }
            let Some(query) = SymptomQuery::new(&state.input) else {
                return (state, Effect::Rejected(Rejection::EmptyInput));
            };
            let generation = state.generation + 1;
            (
                SessionState {
                    result: None,
                    error: None,
                    busy: true,
                    generation,
                    ..state
                },
                Effect::Dispatch { generation, query },
            )
        }

        Event::Succeeded { generation, result } => {
            if !state.busy || generation != state.generation {
                return (state, Effect::Stale);
            }
            (
                SessionState {
                    result: Some(result),
                    error: None,
                    busy: false,
                    ..state
                },
                Effect::None,
            )
        }

        Event::Failed {
            generation,
            failure,
        } => {
            if !state.busy || generation != state.generation {
                return (state, Effect::Stale);
            }
            (
                SessionState {
                    result: None,
                    error: Some(failure),
                    busy: false,
                    ..state
                },
                Effect::None,
            )
        }

        Event::Reset => {
            let effect = if state.busy {
                Effect::Cancel
            } else {
                Effect::None
            };
            (
                SessionState {
                    generation: state.generation + 1,
                    ..SessionState::default()
                },
                effect,
            )
        }
    }
}
