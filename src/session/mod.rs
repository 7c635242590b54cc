//! Drives one symptom check at a time against an [`Advisor`].
//!
//! The state lives in [`SessionState`] and only changes through
//! [`state::transition`]. The driver owns the single suspension point: the
//! outbound call, bounded by a timeout and cancellable by a reset.

pub mod state;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};

use crate::advisor::{Advisor, TokenUsage};
use crate::consts::DEFAULT_TIMEOUT;
use crate::error::{AnalysisError, FailureKind};
use crate::health::HealthInformationResult;
use crate::retry::{RetryPolicy, retry};

pub use state::{Effect, Event, Failure, Rejection, SessionState};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(HealthInformationResult),
    Failed(Failure),
    /// Refused before any call was made.
    Rejected(Rejection),
    /// The session was reset while the call was outstanding; the reply was dropped.
    Superseded,
}

/// Cancel handle of the outstanding call, tagged with its generation.
struct Inflight {
    generation: u64,
    cancel: watch::Sender<bool>,
}

/// Lock order: `state` before `cancel`.
pub struct Session {
    advisor: RwLock<Arc<dyn Advisor>>,
    state: Mutex<SessionState>,
    cancel: Mutex<Option<Inflight>>,
    usage: Mutex<TokenUsage>,
    config: SessionConfig,
}

impl Session {
    pub fn new(advisor: Arc<dyn Advisor>, config: SessionConfig) -> Self {
        Self {
            advisor: RwLock::new(advisor),
            state: Mutex::new(SessionState::default()),
            cancel: Mutex::new(None),
            usage: Mutex::new(TokenUsage::default()),
            config,
        }
    }

    /// Swap the advisor. The next submission uses the new one.
    pub async fn set_advisor(&self, advisor: Arc<dyn Advisor>) {
        *self.advisor.write().await = advisor;
    }

    pub async fn advisor(&self) -> Arc<dyn Advisor> {
        Arc::clone(&*self.advisor.read().await)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Token usage accumulated over the session.
    pub async fn usage(&self) -> TokenUsage {
        *self.usage.lock().await
    }

    async fn apply(&self, event: Event) -> Effect {
        let mut state = self.state.lock().await;
        let (next, effect) = state::transition(std::mem::take(&mut *state), event);
        *state = next;
        effect
    }

    /// Replace the input text.
    pub async fn edit(&self, text: impl Into<String>) {
        self.apply(Event::Edit(text.into())).await;
    }

    /// Append clarifying question `number` (1-based) of the current result
    /// to the input. Returns the question, or `None` if there is no such one.
    pub async fn pick_question(&self, number: usize) -> Option<String> {
        let question = {
            let state = self.state.lock().await;
            let result = state.result.as_ref()?;
            result
                .clarifying_questions()
                .get(number.checked_sub(1)?)?
                .clone()
        };
        self.apply(Event::QuestionPicked(question.clone())).await;
        Some(question)
    }

    /// Start over: clear input, result and error, abandoning any call in flight.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let (next, effect) = state::transition(std::mem::take(&mut *state), Event::Reset);
        *state = next;
        // Signal under the state lock so no new submission can slip in between.
        if effect == Effect::Cancel {
            self.cancel().await;
        }
    }

    /// Abandon the outstanding call, if any. The session records a
    /// cancelled failure unless it was reset first.
    pub async fn cancel(&self) {
        if let Some(inflight) = self.cancel.lock().await.take() {
            tracing::debug!(generation = inflight.generation, "cancelling outstanding call");
            let _ = inflight.cancel.send(true);
        }
    }

    /// Analyze the current input. Makes at most one call (plus retries, if
    /// configured); blank input and overlapping submissions are refused.
    pub async fn submit(&self) -> Outcome {
        let (tx, mut cancel_rx) = watch::channel(false);
        let (generation, query) = {
            let mut state = self.state.lock().await;
            let (next, effect) = state::transition(std::mem::take(&mut *state), Event::Submit);
            *state = next;
            match effect {
                Effect::Dispatch { generation, query } => {
                    // Installed before the state lock is released, so a reset
                    // always finds the sender of the call it abandons.
                    *self.cancel.lock().await = Some(Inflight {
                        generation,
                        cancel: tx,
                    });
                    (generation, query)
                }
                Effect::Rejected(rejection) => return Outcome::Rejected(rejection),
                other => unreachable!("submit yields Dispatch or Rejected, got {other:?}"),
            }
        };

        let advisor = self.advisor().await;
        let timeout = self.config.timeout;
        let call = retry(&self.config.retry, || advisor.analyze(&query));

        let reply = tokio::select! {
            r = tokio::time::timeout(timeout, call) => {
                r.unwrap_or(Err(AnalysisError::Timeout(timeout)))
            }
            _ = cancelled(&mut cancel_rx) => Err(AnalysisError::Cancelled),
        };
        {
            let mut slot = self.cancel.lock().await;
            if slot.as_ref().is_some_and(|i| i.generation == generation) {
                slot.take();
            }
        }

        let event = match reply {
            Ok(analysis) => {
                if let Some(usage) = analysis.usage {
                    self.usage.lock().await.add(usage);
                }
                Event::Succeeded {
                    generation,
                    result: analysis.result,
                }
            }
            Err(e) => {
                let failure = Failure::from(&e);
                if failure.kind == FailureKind::Cancelled {
                    tracing::info!(generation, "analysis cancelled");
                } else {
                    tracing::error!(kind = ?failure.kind, error = %e, "analysis failed");
                }
                Event::Failed {
                    generation,
                    failure,
                }
            }
        };

        let completed = match &event {
            Event::Succeeded { result, .. } => Outcome::Completed(result.clone()),
            Event::Failed { failure, .. } => Outcome::Failed(failure.clone()),
            _ => Outcome::Superseded,
        };

        match self.apply(event).await {
            Effect::Stale => Outcome::Superseded,
            _ => completed,
        }
    }
}

/// Resolves once the flag flips to `true`. A dropped sender means nobody
/// can cancel any more, so this never resolves in that case.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
